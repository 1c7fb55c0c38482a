//! 送信側のフレーミング

use alloc::vec::Vec;

use osc_codec::{OscError, Packet};

use crate::LENGTH_PREFIX_LEN;

/// トランスポートのフレーミング方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FramingMode {
    /// 受信チャンク 1 個 = パケット 1 個（UDP / WebSocket）
    #[default]
    FramedTransport,
    /// 各パケットの前に u32 BE の長さを付けたバイトストリーム（TCP）
    LengthPrefixedStream,
}

/// パケットをフレーミング方式に従ってバッファの末尾に書き出す
///
/// `LengthPrefixedStream` の場合は長さプレフィックスを書き出した後に埋める。
///
/// # エラー
/// - `OscError`: パケットのエンコード失敗。このとき `out` は変更しない
pub fn encode_frame(mode: FramingMode, packet: &Packet, out: &mut Vec<u8>) -> Result<(), OscError> {
    match mode {
        FramingMode::FramedTransport => packet.encode_into(out),
        FramingMode::LengthPrefixedStream => {
            let len_pos = out.len();
            out.extend_from_slice(&[0u8; LENGTH_PREFIX_LEN]);
            if let Err(e) = packet.encode_into(out) {
                out.truncate(len_pos);
                return Err(e);
            }
            let len = (out.len() - len_pos - LENGTH_PREFIX_LEN) as u32;
            out[len_pos..len_pos + LENGTH_PREFIX_LEN].copy_from_slice(&len.to_be_bytes());
            Ok(())
        }
    }
}

/// パケット 1 個分のフレームを返す
pub fn frame_bytes(mode: FramingMode, packet: &Packet) -> Result<Vec<u8>, OscError> {
    let prefix = match mode {
        FramingMode::FramedTransport => 0,
        FramingMode::LengthPrefixedStream => LENGTH_PREFIX_LEN,
    };
    let mut out = Vec::with_capacity(prefix + packet.encoded_len());
    encode_frame(mode, packet, &mut out)?;
    Ok(out)
}

/// 複数のパケットを長さプレフィックス付きで 1 つのバイト列に連結する
///
/// ストリーム型トランスポートに 1 回の書き込みでまとめて送るためのもの。
/// どれか 1 個でもエンコードできなければ全体をエラーにする。
pub fn encode_stream<'a>(
    packets: impl IntoIterator<Item = &'a Packet>,
) -> Result<Vec<u8>, OscError> {
    let mut out = Vec::new();
    for packet in packets {
        encode_frame(FramingMode::LengthPrefixedStream, packet, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osc_codec::Message;

    fn packet(address: &str) -> Packet {
        Packet::from(Message::new(address).unwrap().with_arg(1))
    }

    #[test]
    fn test_framed_has_no_prefix() {
        let p = packet("/a");
        assert_eq!(
            frame_bytes(FramingMode::FramedTransport, &p).unwrap(),
            p.to_bytes().unwrap()
        );
    }

    #[test]
    fn test_length_prefix() {
        let p = packet("/test/1");
        let frame = frame_bytes(FramingMode::LengthPrefixedStream, &p).unwrap();
        assert_eq!(&frame[..4], &(p.encoded_len() as u32).to_be_bytes());
        assert_eq!(&frame[4..], p.to_bytes().unwrap().as_slice());
    }

    #[test]
    fn test_encode_stream_concatenates() {
        let packets = [packet("/a"), packet("/bb")];
        let stream = encode_stream(&packets).unwrap();

        let first = frame_bytes(FramingMode::LengthPrefixedStream, &packets[0]).unwrap();
        let second = frame_bytes(FramingMode::LengthPrefixedStream, &packets[1]).unwrap();
        assert_eq!(stream.len(), first.len() + second.len());
        assert_eq!(&stream[..first.len()], first.as_slice());
        assert_eq!(&stream[first.len()..], second.as_slice());
    }

    #[test]
    fn test_default_mode_is_framed() {
        assert_eq!(FramingMode::default(), FramingMode::FramedTransport);
    }

    #[test]
    fn test_unencodable_packet_leaves_buffer_untouched() {
        let bad = Packet::from(Message::new("/bad").unwrap().with_arg("nul\0inside"));
        for mode in [FramingMode::FramedTransport, FramingMode::LengthPrefixedStream] {
            let mut out = alloc::vec![1u8, 2, 3];
            assert!(encode_frame(mode, &bad, &mut out).is_err());
            assert_eq!(out, [1, 2, 3], "{:?}", mode);
        }
        assert!(encode_stream(&[packet("/ok"), bad]).is_err());
    }
}
