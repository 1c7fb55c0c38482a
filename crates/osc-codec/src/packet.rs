//! OSC パケット（トランスポートとやり取りする単位）
//!
//! 先頭 1 バイトで種類を判別する:
//! - `/` → Message
//! - `#` → Bundle
//! - それ以外 → `UnknownPacketType`

use alloc::vec::Vec;

use crate::bundle::Bundle;
use crate::error::OscError;
use crate::message::Message;
use crate::timetag::TimeTag;
use crate::DEFAULT_MAX_DEPTH;

/// 単一のメッセージ、またはバンドル
///
/// バンドルの要素型も兼ねる。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Packet {
    Message(Message),
    Bundle(Bundle),
}

impl Packet {
    /// OSC のバイト列にシリアライズする
    ///
    /// # エラー
    /// - `OscError::MalformedArgument`: ワイヤ上で表現できない引数を含む
    pub fn to_bytes(&self) -> Result<Vec<u8>, OscError> {
        match self {
            Packet::Message(m) => m.to_bytes(),
            Packet::Bundle(b) => b.to_bytes(),
        }
    }

    /// 既存のバッファの末尾にシリアライズする
    ///
    /// 失敗時は `out` を変更しない。
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), OscError> {
        match self {
            Packet::Message(m) => m.encode_into(out),
            Packet::Bundle(b) => b.encode_into(out),
        }
    }

    /// シリアライズ後のバイト数
    pub fn encoded_len(&self) -> usize {
        match self {
            Packet::Message(m) => m.encoded_len(),
            Packet::Bundle(b) => b.encoded_len(),
        }
    }

    /// バイト列からパケットをデコードする（入れ子の上限は `DEFAULT_MAX_DEPTH`）
    ///
    /// # エラー
    /// - `OscError::UnknownPacketType`: 空、または先頭が `/` でも `#` でもない
    /// - その他 Message / Bundle のデコードエラー
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OscError> {
        Self::from_bytes_with_depth(bytes, DEFAULT_MAX_DEPTH)
    }

    /// バンドルの入れ子の上限を指定してデコードする
    pub fn from_bytes_with_depth(bytes: &[u8], max_depth: usize) -> Result<Self, OscError> {
        match bytes.first() {
            Some(b'/') => Message::from_bytes(bytes).map(Packet::Message),
            Some(b'#') => Bundle::decode(bytes, 1, max_depth).map(Packet::Bundle),
            other => Err(OscError::UnknownPacketType(other.copied())),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Packet::Message(_))
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Packet::Bundle(_))
    }

    /// 含まれるすべてのメッセージを深さ優先で列挙する
    ///
    /// 各メッセージは、それを直接含むバンドルのタイムタグと組で返る。
    /// 単一メッセージのパケットは即時実行タイムタグと組になる。
    pub fn messages(&self) -> Messages<'_> {
        match self {
            Packet::Message(m) => Messages {
                single: Some(m),
                stack: Vec::new(),
            },
            Packet::Bundle(b) => Messages {
                single: None,
                stack: alloc::vec![(b.timetag, b.elements.iter())],
            },
        }
    }
}

impl From<Message> for Packet {
    fn from(m: Message) -> Self {
        Packet::Message(m)
    }
}

impl From<Bundle> for Packet {
    fn from(b: Bundle) -> Self {
        Packet::Bundle(b)
    }
}

impl core::fmt::Display for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Packet::Message(m) => write!(f, "{}", m),
            Packet::Bundle(b) => write!(f, "{}", b),
        }
    }
}

/// `Packet::messages` のイテレータ
///
/// 再帰ではなく明示的なスタックで入れ子を辿る。
pub struct Messages<'a> {
    single: Option<&'a Message>,
    stack: Vec<(TimeTag, core::slice::Iter<'a, Packet>)>,
}

impl<'a> Iterator for Messages<'a> {
    type Item = (TimeTag, &'a Message);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(m) = self.single.take() {
            return Some((TimeTag::IMMEDIATE, m));
        }
        loop {
            let (timetag, next) = {
                let (timetag, iter) = self.stack.last_mut()?;
                (*timetag, iter.next())
            };
            match next {
                Some(Packet::Message(m)) => return Some((timetag, m)),
                Some(Packet::Bundle(b)) => self.stack.push((b.timetag, b.elements.iter())),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundleError;

    fn msg(address: &str) -> Message {
        Message::new(address).unwrap()
    }

    #[test]
    fn test_dispatch_on_first_byte() {
        let m = Packet::from(msg("/a"));
        assert_eq!(Packet::from_bytes(&m.to_bytes().unwrap()).unwrap(), m);

        let b = Packet::from(Bundle::new().with_element(msg("/a")));
        assert_eq!(Packet::from_bytes(&b.to_bytes().unwrap()).unwrap(), b);
    }

    #[test]
    fn test_unknown_packet_type() {
        assert_eq!(
            Packet::from_bytes(b"abc\0"),
            Err(OscError::UnknownPacketType(Some(b'a')))
        );
        assert_eq!(Packet::from_bytes(b""), Err(OscError::UnknownPacketType(None)));
    }

    #[test]
    fn test_hash_without_bundle_marker() {
        assert_eq!(Packet::from_bytes(b"#foo\0\0\0\0"), Err(OscError::NotABundle));
    }

    #[test]
    fn test_depth_limit_through_packet() {
        let mut bundle = Bundle::new().with_element(msg("/leaf"));
        for _ in 0..3 {
            bundle = Bundle::new().with_element(bundle);
        }
        let bytes = Packet::from(bundle).to_bytes().unwrap();
        assert!(Packet::from_bytes_with_depth(&bytes, 4).is_ok());
        assert_eq!(
            Packet::from_bytes_with_depth(&bytes, 3),
            Err(OscError::MalformedBundle(BundleError::DepthExceeded { max_depth: 3 }))
        );
    }

    #[test]
    fn test_messages_depth_first_with_timetags() {
        let inner = Bundle::with_timetag(TimeTag(500))
            .with_element(msg("/inner/1"))
            .with_element(msg("/inner/2"));
        let packet = Packet::from(
            Bundle::with_timetag(TimeTag(100))
                .with_element(msg("/first"))
                .with_element(inner)
                .with_element(msg("/last")),
        );

        let visited: Vec<(u64, &str)> = packet
            .messages()
            .map(|(t, m)| (t.raw(), m.address()))
            .collect();
        assert_eq!(
            visited,
            [(100, "/first"), (500, "/inner/1"), (500, "/inner/2"), (100, "/last")]
        );
    }

    #[test]
    fn test_messages_single() {
        let packet = Packet::from(msg("/solo"));
        let visited: Vec<_> = packet.messages().collect();
        assert_eq!(visited.len(), 1);
        assert!(visited[0].0.is_immediate());
    }
}
