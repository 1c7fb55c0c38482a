//! OSC アドレスパターン
//!
//! ワイルドカードの展開・マッチングは行わない（ディスパッチャ側の責任）。

use alloc::string::{String, ToString};

use crate::error::AddressError;

/// 検証済みの OSC アドレス（例: `/test/1`）
///
/// 不変条件: 空でない・先頭が `/`・NUL を含まない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct AddressPattern(String);

impl AddressPattern {
    /// 文字列を検証して AddressPattern を生成する
    ///
    /// # エラー
    /// - `AddressError::Empty`: 空文字列
    /// - `AddressError::MissingLeadingSlash`: 先頭が `/` ではない
    /// - `AddressError::ContainsNul`: NUL を含む
    pub fn new(address: &str) -> Result<Self, AddressError> {
        Self::validate(address)?;
        Ok(AddressPattern(address.to_string()))
    }

    /// 検証のみ行う
    pub fn validate(address: &str) -> Result<(), AddressError> {
        if address.is_empty() {
            return Err(AddressError::Empty);
        }
        if !address.starts_with('/') {
            return Err(AddressError::MissingLeadingSlash);
        }
        if address.bytes().any(|b| b == 0) {
            return Err(AddressError::ContainsNul);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 内部の String を取り出す
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for AddressPattern {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AddressPattern::new(value)
    }
}

impl TryFrom<String> for AddressPattern {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(AddressPattern(value))
    }
}

impl core::str::FromStr for AddressPattern {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressPattern::new(s)
    }
}

impl From<AddressPattern> for String {
    fn from(value: AddressPattern) -> Self {
        value.0
    }
}

impl AsRef<str> for AddressPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
