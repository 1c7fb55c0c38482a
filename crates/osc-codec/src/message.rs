//! OSC メッセージ
//!
//! ## Wire Format
//! ```text
//! [address: NUL 終端 + パディング][",tags": NUL 終端 + パディング][payloads...]
//! ```
//!
//! 例: `/test/1` に int32 の 42 と 14
//! ```text
//! 2f 74 65 73 74 2f 31 00   "/test/1\0"
//! 2c 69 69 00               ",ii\0"
//! 00 00 00 2a               42
//! 00 00 00 0e               14
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::address::AddressPattern;
use crate::argument::Argument;
use crate::codec;
use crate::error::{MessageError, OscError};
use crate::pad4;
use crate::reader::Reader;

/// OSC メッセージ（アドレス + 順序付きの引数列）
///
/// 構築中は `push` で引数を追記する。シリアライズ後に変更しないのは利用側の約束であり、
/// 型としては強制しない。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub address: AddressPattern,
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<Argument>,
}

impl Message {
    /// アドレス文字列から引数なしのメッセージを生成する
    ///
    /// # エラー
    /// - `OscError::InvalidAddress`: 空・先頭が `/` でない・NUL を含む
    pub fn new(address: &str) -> Result<Self, OscError> {
        Ok(Self::with_address(AddressPattern::new(address)?))
    }

    /// 検証済みアドレスから生成する
    pub fn with_address(address: AddressPattern) -> Self {
        Message {
            address,
            args: Vec::new(),
        }
    }

    /// 引数を末尾に追加する（スキーマ検証なし）
    ///
    /// ```
    /// # use osc_codec::Message;
    /// let mut msg = Message::new("/test/1").unwrap();
    /// msg.push(42).push(14);
    /// assert_eq!(msg.type_tags(), ",ii");
    /// ```
    pub fn push(&mut self, arg: impl Into<Argument>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// `push` のビルダー版
    pub fn with_arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// 型タグ文字列（`,` + 引数ごとの型タグ）
    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(Argument::tag));
        tags
    }

    /// シリアライズ後のバイト数（常に 4 の倍数）
    pub fn encoded_len(&self) -> usize {
        pad4(self.address.as_str().len() + 1)
            + pad4(self.args.len() + 2)
            + self.args.iter().map(Argument::payload_len).sum::<usize>()
    }

    /// OSC メッセージのバイト列にシリアライズする
    ///
    /// # エラー
    /// - `OscError::MalformedArgument`: ワイヤ上で表現できない引数
    ///   （NUL を含む文字列、i32 に収まらない Blob）
    pub fn to_bytes(&self) -> Result<Vec<u8>, OscError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// 既存のバッファの末尾にシリアライズする
    ///
    /// 引数をすべてエンコードしてから書き出すため、失敗時は `out` を変更しない。
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), OscError> {
        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        let mut payload = Vec::new();
        for arg in &self.args {
            codec::encode(arg, &mut tags, &mut payload)?;
        }

        codec::write_padded_str(out, self.address.as_str().as_bytes());
        codec::write_padded_str(out, tags.as_bytes());
        out.extend_from_slice(&payload);
        Ok(())
    }

    /// バイト列からメッセージをデコードする
    ///
    /// 型タグ文字列を持たない（アドレスのみの）メッセージは引数 0 個として扱う。
    ///
    /// # エラー
    /// - `OscError::MalformedMessage`: アドレス/型タグ文字列が終端・パディングされていない、
    ///   アドレスが不正、引数ペイロードが途中で切れている、末尾に余分なバイトがある
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OscError> {
        Self::decode(bytes).map_err(OscError::MalformedMessage)
    }

    fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = Reader::new(bytes);

        let raw_address = reader
            .read_padded_str()
            .ok_or(MessageError::UnterminatedAddress)?;
        let address = core::str::from_utf8(raw_address)
            .map_err(|_| MessageError::AddressNotUtf8)
            .and_then(|s| AddressPattern::new(s).map_err(MessageError::InvalidAddress))?;

        if reader.is_empty() {
            return Ok(Message::with_address(address));
        }

        if reader.peek_rest().first() != Some(&b',') {
            return Err(MessageError::MissingTypeTags);
        }
        let tags = reader
            .read_padded_str()
            .ok_or(MessageError::UnterminatedTypeTags)?;

        let mut args = Vec::with_capacity(tags.len() - 1);
        for &tag in &tags[1..] {
            let arg = codec::decode_raw(tag as char, &mut reader)
                .map_err(MessageError::Argument)?;
            args.push(arg);
        }

        if !reader.is_empty() {
            return Err(MessageError::TrailingBytes(reader.remaining()));
        }

        Ok(Message { address, args })
    }
}

/// `[size] "/address" : ,tags : args...` 形式で表示する
impl core::fmt::Display for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] \"{}\" : {} :",
            self.encoded_len(),
            self.address,
            self.type_tags()
        )?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgumentError;
    use alloc::string::ToString;

    fn sample() -> Message {
        let mut msg = Message::new("/test/1").unwrap();
        msg.push(42).push(14);
        msg
    }

    #[test]
    fn test_scenario_two_ints_is_20_bytes() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..8], b"/test/1\0");
        assert_eq!(&bytes[8..12], b",ii\0");
        assert_eq!(&bytes[12..16], &42i32.to_be_bytes());
        assert_eq!(&bytes[16..20], &14i32.to_be_bytes());
    }

    #[test]
    fn test_roundtrip_mixed_arguments() {
        let msg = Message::new("/mixer/channel/3")
            .unwrap()
            .with_arg(-7)
            .with_arg(0.25f32)
            .with_arg("gain")
            .with_arg(alloc::vec![0xDEu8, 0xAD, 0xBE])
            .with_arg(true)
            .with_arg(Argument::Nil)
            .with_arg(1i64 << 40)
            .with_arg(Argument::Double(2.5));

        let bytes = msg.to_bytes().unwrap();
        assert_eq!(bytes.len(), msg.encoded_len());
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(Message::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_no_arguments() {
        let msg = Message::new("/test/2").unwrap();
        let bytes = msg.to_bytes().unwrap();
        assert_eq!(bytes, b"/test/2\0,\0\0\0");
        assert_eq!(Message::from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn test_missing_type_tag_string_accepted() {
        let msg = Message::from_bytes(b"/legacy\0").unwrap();
        assert_eq!(msg.address(), "/legacy");
        assert!(msg.args.is_empty());
    }

    #[test]
    fn test_invalid_address_at_construction() {
        assert!(matches!(
            Message::new("test/1"),
            Err(OscError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_unterminated_address() {
        assert_eq!(
            Message::from_bytes(b"/abc"),
            Err(OscError::MalformedMessage(MessageError::UnterminatedAddress))
        );
    }

    #[test]
    fn test_unterminated_type_tags() {
        assert_eq!(
            Message::from_bytes(b"/abc\0\0\0\0,iii"),
            Err(OscError::MalformedMessage(MessageError::UnterminatedTypeTags))
        );
    }

    #[test]
    fn test_type_tags_without_comma() {
        assert_eq!(
            Message::from_bytes(b"/abc\0\0\0\0ii\0\0"),
            Err(OscError::MalformedMessage(MessageError::MissingTypeTags))
        );
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.truncate(18);
        assert!(matches!(
            Message::from_bytes(&bytes),
            Err(OscError::MalformedMessage(MessageError::Argument(
                ArgumentError::Truncated { tag: 'i', .. }
            )))
        ));
    }

    #[test]
    fn test_unknown_tag_is_error() {
        assert_eq!(
            Message::from_bytes(b"/abc\0\0\0\0,x\0\0\0\0\0\0"),
            Err(OscError::MalformedMessage(MessageError::Argument(
                ArgumentError::UnknownTag('x')
            )))
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(
            Message::from_bytes(&bytes),
            Err(OscError::MalformedMessage(MessageError::TrailingBytes(4)))
        );
    }

    #[test]
    fn test_string_with_nul_cannot_be_encoded() {
        let msg = Message::new("/a")
            .unwrap()
            .with_arg(Argument::String("x\0yz".into()))
            .with_arg(7);
        assert_eq!(
            msg.to_bytes(),
            Err(OscError::MalformedArgument(ArgumentError::ContainsNul))
        );

        let symbol = Message::new("/a")
            .unwrap()
            .with_arg(Argument::Symbol("\0".into()));
        assert_eq!(
            symbol.to_bytes(),
            Err(OscError::MalformedArgument(ArgumentError::ContainsNul))
        );
    }

    #[test]
    fn test_failed_encode_leaves_buffer_untouched() {
        let msg = Message::new("/a").unwrap().with_arg(1).with_arg("ab\0");
        let mut out = alloc::vec![0xAAu8, 0xBB];
        assert!(msg.encode_into(&mut out).is_err());
        assert_eq!(out, [0xAA, 0xBB]);
    }

    #[test]
    fn test_display_matches_legacy_format() {
        let mut msg = sample();
        msg.push("hi").push(alloc::vec![1u8, 2]);
        assert_eq!(
            msg.to_string(),
            "[36] \"/test/1\" : ,iisb : 42 14 \"hi\" <Blob length 2>"
        );
    }
}
