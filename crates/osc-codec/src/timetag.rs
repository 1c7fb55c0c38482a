//! OSC タイムタグ（64ビット NTP タイムスタンプ）
//!
//! 上位 32 ビットが 1900-01-01 UTC からの秒数、下位 32 ビットが秒の小数部（2^-32 秒単位）。
//! 生の値 `1` は「即時実行」を意味する予約値。
//!
//! 秒フィールドは 32 ビットのため 2036-02-07 でラップアラウンドする（NTP era 0 のみ扱う）。
//! それ以降の時刻は mod 2^32 で格納される。

use core::time::Duration;

use crate::NTP_UNIX_OFFSET_SECS;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// OSC タイムタグ
///
/// 比較は単純な u64 の大小比較。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TimeTagRepr", into = "TimeTagRepr"))]
pub struct TimeTag(pub u64);

impl TimeTag {
    /// 即時実行を表す予約値（0 ではなく 1）
    pub const IMMEDIATE: Self = TimeTag(1);

    /// 即時実行のタイムタグを返す
    pub const fn immediate() -> Self {
        Self::IMMEDIATE
    }

    /// 生の 64 ビット値から生成する
    pub const fn from_raw(raw: u64) -> Self {
        TimeTag(raw)
    }

    /// 秒と小数部から生成する
    pub const fn from_parts(seconds: u32, fraction: u32) -> Self {
        TimeTag(((seconds as u64) << 32) | fraction as u64)
    }

    /// 生の 64 ビット値
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// 1900 年からの秒数（上位 32 ビット）
    pub const fn seconds(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// 秒の小数部（下位 32 ビット、2^-32 秒単位）
    pub const fn fraction(&self) -> u32 {
        self.0 as u32
    }

    pub const fn is_immediate(&self) -> bool {
        self.0 == Self::IMMEDIATE.0
    }

    /// Unix エポックからの経過時間からタイムタグを生成する
    ///
    /// 小数部は 2^-32 秒単位に切り捨てる（1 単位 ≒ 0.23 ns）。
    pub fn from_unix_duration(since_unix: Duration) -> Self {
        let seconds = since_unix.as_secs().wrapping_add(NTP_UNIX_OFFSET_SECS) as u32;
        let fraction = ((since_unix.subsec_nanos() as u64) << 32) / NANOS_PER_SEC;
        Self::from_parts(seconds, fraction as u32)
    }

    /// Unix エポックからの経過時間に変換する
    ///
    /// # 戻り値
    /// - `None`: 1970 年より前の時刻（即時実行の予約値を含む）
    ///
    /// ナノ秒は四捨五入するため、`from_unix_duration` との往復でナノ秒まで一致する。
    pub fn to_unix_duration(&self) -> Option<Duration> {
        let secs = (self.seconds() as u64).checked_sub(NTP_UNIX_OFFSET_SECS)?;
        let nanos = ((self.fraction() as u64) * NANOS_PER_SEC + (1 << 31)) >> 32;
        // nanos が 10^9 に丸め上がった場合は Duration::new が秒に繰り上げる
        Some(Duration::new(secs, nanos as u32))
    }

    /// Unix ミリ秒（JS の `Date.now()` の値）から生成する
    pub fn from_unix_ms(unix_ms: u64) -> Self {
        Self::from_unix_duration(Duration::from_millis(unix_ms))
    }

    /// Unix ミリ秒に変換する（1970 年より前なら `None`）
    pub fn to_unix_ms(&self) -> Option<u64> {
        self.to_unix_duration().map(|d| d.as_millis() as u64)
    }
}

impl Default for TimeTag {
    fn default() -> Self {
        Self::IMMEDIATE
    }
}

impl From<u64> for TimeTag {
    fn from(raw: u64) -> Self {
        TimeTag(raw)
    }
}

impl From<TimeTag> for u64 {
    fn from(tag: TimeTag) -> Self {
        tag.0
    }
}

#[cfg(feature = "std")]
impl From<std::time::SystemTime> for TimeTag {
    /// 1970 年より前の時刻は Unix エポックとして扱う
    fn from(time: std::time::SystemTime) -> Self {
        let since_unix = time
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self::from_unix_duration(since_unix)
    }
}

#[cfg(feature = "std")]
impl TryFrom<TimeTag> for std::time::SystemTime {
    type Error = TimeTag;

    fn try_from(tag: TimeTag) -> Result<Self, Self::Error> {
        tag.to_unix_duration()
            .map(|d| std::time::UNIX_EPOCH + d)
            .ok_or(tag)
    }
}

/// JSON 表現（JS の Number は 2^53 までしか正確に扱えないため 32 ビットずつに分ける）
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct TimeTagRepr {
    seconds: u32,
    fraction: u32,
}

#[cfg(feature = "serde")]
impl From<TimeTagRepr> for TimeTag {
    fn from(repr: TimeTagRepr) -> Self {
        TimeTag::from_parts(repr.seconds, repr.fraction)
    }
}

#[cfg(feature = "serde")]
impl From<TimeTag> for TimeTagRepr {
    fn from(tag: TimeTag) -> Self {
        TimeTagRepr {
            seconds: tag.seconds(),
            fraction: tag.fraction(),
        }
    }
}
