//! OSC バンドル
//!
//! ## Wire Format
//! ```text
//! ["#bundle\0": 8 bytes]
//! [timetag: u64 BE (8 bytes)]
//! [element length: u32 BE][element bytes]   ← 要素数だけ繰り返し
//! ```
//!
//! 要素は Message または Bundle。入れ子のバンドルも同じ構造を再帰的に持つ。
//! デコード時は深さカウンタを引き回し、上限を超えたら `MalformedBundle` で打ち切る。

use alloc::vec::Vec;

use crate::error::{BundleError, OscError};
use crate::message::Message;
use crate::packet::Packet;
use crate::reader::Reader;
use crate::timetag::TimeTag;
use crate::{BUNDLE_MARKER, DEFAULT_MAX_DEPTH};

/// マーカー(8) + タイムタグ(8)
const HEADER_LEN: usize = 16;

/// OSC バンドル（タイムタグ + 順序付きの要素列）
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bundle {
    #[cfg_attr(feature = "serde", serde(default))]
    pub timetag: TimeTag,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elements: Vec<Packet>,
}

impl Bundle {
    /// 即時実行タイムタグの空のバンドルを生成する
    pub fn new() -> Self {
        Self::with_timetag(TimeTag::IMMEDIATE)
    }

    pub fn with_timetag(timetag: TimeTag) -> Self {
        Bundle {
            timetag,
            elements: Vec::new(),
        }
    }

    /// 要素（Message または Bundle）を末尾に追加する
    pub fn push(&mut self, element: impl Into<Packet>) -> &mut Self {
        self.elements.push(element.into());
        self
    }

    /// `push` のビルダー版
    pub fn with_element(mut self, element: impl Into<Packet>) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// バイト列がバンドルマーカーで始まるか
    pub fn is_bundle(bytes: &[u8]) -> bool {
        bytes.starts_with(BUNDLE_MARKER)
    }

    /// シリアライズ後のバイト数
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + self
                .elements
                .iter()
                .map(|e| 4 + e.encoded_len())
                .sum::<usize>()
    }

    /// OSC バンドルのバイト列にシリアライズする
    ///
    /// # エラー
    /// - 要素のエンコードエラー（`MalformedArgument`）をそのまま返す
    pub fn to_bytes(&self) -> Result<Vec<u8>, OscError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// 既存のバッファの末尾にシリアライズする
    ///
    /// 各要素の長さプレフィックスは、要素を書き出した後に埋める。
    /// 失敗時は書きかけの部分を取り除き、`out` を呼び出し前の長さに戻す。
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), OscError> {
        let start = out.len();
        let result = self.encode_elements(out);
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    fn encode_elements(&self, out: &mut Vec<u8>) -> Result<(), OscError> {
        out.extend_from_slice(BUNDLE_MARKER);
        out.extend_from_slice(&self.timetag.raw().to_be_bytes());

        for element in &self.elements {
            let len_pos = out.len();
            out.extend_from_slice(&[0u8; 4]);
            element.encode_into(out)?;
            let element_len = (out.len() - len_pos - 4) as u32;
            out[len_pos..len_pos + 4].copy_from_slice(&element_len.to_be_bytes());
        }
        Ok(())
    }

    /// バイト列からバンドルをデコードする（入れ子の上限は `DEFAULT_MAX_DEPTH`）
    ///
    /// # エラー
    /// - `OscError::NotABundle`: `#bundle\0` で始まっていない
    /// - `OscError::MalformedBundle`: 長さプレフィックスが残りを超える、入れ子が深すぎる等
    /// - 要素のデコードエラー（`MalformedMessage` 等）はそのまま返す
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OscError> {
        Self::from_bytes_with_depth(bytes, DEFAULT_MAX_DEPTH)
    }

    /// 入れ子の上限を指定してデコードする
    ///
    /// 最上位のバンドルが深さ 1。`max_depth` を超える深さのバンドルがあればエラー。
    pub fn from_bytes_with_depth(bytes: &[u8], max_depth: usize) -> Result<Self, OscError> {
        Self::decode(bytes, 1, max_depth)
    }

    pub(crate) fn decode(bytes: &[u8], depth: usize, max_depth: usize) -> Result<Self, OscError> {
        if !Self::is_bundle(bytes) {
            return Err(OscError::NotABundle);
        }
        if depth > max_depth {
            return Err(OscError::MalformedBundle(BundleError::DepthExceeded { max_depth }));
        }

        let mut reader = Reader::new(bytes);
        reader.take(BUNDLE_MARKER.len());
        let timetag = reader
            .read_u64()
            .map(TimeTag)
            .ok_or(OscError::MalformedBundle(BundleError::TooShort))?;

        let mut elements = Vec::new();
        while !reader.is_empty() {
            let declared = reader
                .read_u32()
                .ok_or(OscError::MalformedBundle(BundleError::TruncatedLength))?
                as usize;
            let remaining = reader.remaining();
            let element = reader.take(declared).ok_or(OscError::MalformedBundle(
                BundleError::LengthExceedsRemaining { declared, remaining },
            ))?;
            elements.push(Self::decode_element(element, depth, max_depth)?);
        }

        Ok(Bundle { timetag, elements })
    }

    /// 要素の先頭 1 バイトで Message か入れ子の Bundle かを判別する
    fn decode_element(bytes: &[u8], depth: usize, max_depth: usize) -> Result<Packet, OscError> {
        match bytes.first() {
            Some(b'/') => Message::from_bytes(bytes).map(Packet::Message),
            // 最上位と同じく、マーカーが不完全なら NotABundle
            Some(b'#') => Self::decode(bytes, depth + 1, max_depth).map(Packet::Bundle),
            other => Err(OscError::MalformedBundle(BundleError::UnknownElement(
                other.copied(),
            ))),
        }
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for Bundle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] #bundle <TimeTag {}.{}> ({} elements)",
            self.encoded_len(),
            self.timetag.seconds(),
            self.timetag.fraction(),
            self.elements.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArgumentError, MessageError};

    /// 1970-09-18 00:00:00 UTC
    const SEPT_18_1970_MS: u64 = 260 * 86_400 * 1000;

    fn msg(address: &str) -> Message {
        Message::new(address).unwrap()
    }

    /// 二つのメッセージと、タイムタグ付きの入れ子バンドルを含むバンドル
    fn demo_bundle() -> Bundle {
        let mut inner = Bundle::with_timetag(TimeTag::from_unix_ms(SEPT_18_1970_MS));
        inner.push(msg("/test/3")).push(msg("/test/4")).push(msg("/test/5"));

        let mut first = msg("/test/1");
        first.push(42).push(14);

        let mut outer = Bundle::new();
        outer.push(first).push(msg("/test/2")).push(inner);
        outer
    }

    #[test]
    fn test_header_layout() {
        let bytes = Bundle::new().to_bytes().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..8], b"#bundle\0");
        assert_eq!(&bytes[8..16], &1u64.to_be_bytes());
    }

    #[test]
    fn test_element_length_prefix() {
        let mut first = msg("/test/1");
        first.push(42).push(14);
        let bytes = Bundle::new().with_element(first).to_bytes().unwrap();
        assert_eq!(bytes.len(), 16 + 4 + 20);
        assert_eq!(&bytes[16..20], &20u32.to_be_bytes());
        assert_eq!(&bytes[20..28], b"/test/1\0");
    }

    #[test]
    fn test_nested_roundtrip_preserves_order_and_timetag() {
        let bundle = demo_bundle();
        let bytes = bundle.to_bytes().unwrap();
        assert_eq!(bytes.len(), bundle.encoded_len());

        let decoded = Bundle::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, bundle);

        let addresses: Vec<&str> = decoded
            .elements
            .iter()
            .filter_map(|e| match e {
                Packet::Message(m) => Some(m.address()),
                Packet::Bundle(_) => None,
            })
            .collect();
        assert_eq!(addresses, ["/test/1", "/test/2"]);

        match &decoded.elements[2] {
            Packet::Bundle(inner) => {
                assert_eq!(inner.timetag.seconds(), 2_231_452_800);
                assert_eq!(inner.timetag.to_unix_ms(), Some(SEPT_18_1970_MS));
                assert_eq!(inner.len(), 3);
            }
            other => panic!("expected nested bundle, got {:?}", other),
        }
    }

    #[test]
    fn test_not_a_bundle() {
        assert_eq!(Bundle::from_bytes(b"/test\0\0\0"), Err(OscError::NotABundle));
        assert_eq!(Bundle::from_bytes(b"#bundlX\0"), Err(OscError::NotABundle));
        assert_eq!(Bundle::from_bytes(b""), Err(OscError::NotABundle));
    }

    #[test]
    fn test_missing_timetag() {
        assert_eq!(
            Bundle::from_bytes(b"#bundle\0\0\0\0\0"),
            Err(OscError::MalformedBundle(BundleError::TooShort))
        );
    }

    #[test]
    fn test_length_exceeds_remaining() {
        let mut bytes = Bundle::new().with_element(msg("/a")).to_bytes().unwrap();
        // 要素長を 100 に書き換える
        bytes[16..20].copy_from_slice(&100u32.to_be_bytes());
        assert_eq!(
            Bundle::from_bytes(&bytes),
            Err(OscError::MalformedBundle(BundleError::LengthExceedsRemaining {
                declared: 100,
                remaining: 8,
            }))
        );
    }

    #[test]
    fn test_truncated_length_prefix() {
        let mut bytes = Bundle::new().to_bytes().unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(
            Bundle::from_bytes(&bytes),
            Err(OscError::MalformedBundle(BundleError::TruncatedLength))
        );
    }

    #[test]
    fn test_unknown_element() {
        let mut bytes = Bundle::new().to_bytes().unwrap();
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(b"xyz\0");
        assert_eq!(
            Bundle::from_bytes(&bytes),
            Err(OscError::MalformedBundle(BundleError::UnknownElement(Some(b'x'))))
        );
    }

    #[test]
    fn test_nested_element_with_broken_marker() {
        let mut bytes = Bundle::new().to_bytes().unwrap();
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(b"#bundlX\0");
        bytes.extend_from_slice(&1u64.to_be_bytes());
        assert_eq!(Bundle::from_bytes(&bytes), Err(OscError::NotABundle));

        let mut short = Bundle::new().to_bytes().unwrap();
        short.extend_from_slice(&4u32.to_be_bytes());
        short.extend_from_slice(b"#ab\0");
        assert_eq!(Bundle::from_bytes(&short), Err(OscError::NotABundle));
    }

    #[test]
    fn test_element_with_nul_string_is_not_encoded() {
        let bad = msg("/a").with_arg("ab\0");
        let bundle = Bundle::new()
            .with_element(msg("/ok"))
            .with_element(Bundle::new().with_element(bad));
        assert_eq!(
            bundle.to_bytes(),
            Err(OscError::MalformedArgument(ArgumentError::ContainsNul))
        );

        let mut out = alloc::vec![1u8, 2, 3];
        assert!(bundle.encode_into(&mut out).is_err());
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_element_error_propagates() {
        let mut bytes = Bundle::new().to_bytes().unwrap();
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(b"/abc");
        assert_eq!(
            Bundle::from_bytes(&bytes),
            Err(OscError::MalformedMessage(MessageError::UnterminatedAddress))
        );
    }

    fn nested(levels: usize) -> Bundle {
        let mut bundle = Bundle::new().with_element(msg("/leaf"));
        for _ in 1..levels {
            bundle = Bundle::new().with_element(bundle);
        }
        bundle
    }

    #[test]
    fn test_depth_at_limit_ok() {
        let bytes = nested(4).to_bytes().unwrap();
        assert!(Bundle::from_bytes_with_depth(&bytes, 4).is_ok());
    }

    #[test]
    fn test_depth_one_over_limit_fails() {
        let bytes = nested(5).to_bytes().unwrap();
        assert_eq!(
            Bundle::from_bytes_with_depth(&bytes, 4),
            Err(OscError::MalformedBundle(BundleError::DepthExceeded { max_depth: 4 }))
        );
    }

    #[test]
    fn test_is_bundle() {
        assert!(Bundle::is_bundle(&Bundle::new().to_bytes().unwrap()));
        assert!(!Bundle::is_bundle(&msg("/x").to_bytes().unwrap()));
        assert!(!Bundle::is_bundle(b"#bund"));
    }
}
