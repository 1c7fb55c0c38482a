//! osc-transport エラー型

use alloc::string::String;

use osc_codec::OscError;

/// 受信フレームの処理エラー
///
/// いずれの場合も StreamAssembler は該当フレームを破棄して初期状態に戻る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// フレームは揃ったが OSC パケットとしてデコードできない
    Decode(OscError),
    /// 長さプレフィックスが上限を超える（バッファ全体を破棄）
    FrameTooLarge {
        /// 長さプレフィックスの値
        len: usize,
        /// 設定上の上限
        max: usize,
    },
}

/// トランスポートへの送信エラー
///
/// ProxyClient はこのエラーを呼び出し側へそのまま返し、再送はしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 接続が既に閉じている
    Closed,
    /// 書き込みに失敗した
    WriteFailed(String),
}

impl From<OscError> for FrameError {
    fn from(e: OscError) -> Self {
        FrameError::Decode(e)
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Decode(e) => write!(f, "Frame decode failed: {}", e),
            FrameError::FrameTooLarge { len, max } => {
                write!(f, "Frame too large: {} bytes (max {})", len, max)
            }
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Closed => write!(f, "Transport closed"),
            TransportError::WriteFailed(reason) => write!(f, "Transport write failed: {}", reason),
        }
    }
}
