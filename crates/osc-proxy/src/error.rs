//! osc-proxy エラー型

use osc_codec::OscError;
use osc_transport::{FrameError, TransportError};

/// ProxyClient のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// トランスポートへの送信失敗、またはトランスポートからの通知
    Transport(TransportError),
    /// 受信フレームを破棄した
    Frame(FrameError),
    /// 送信しようとしたパケットをエンコードできない
    Encode(OscError),
    /// クライアントは既に閉じている
    Closed,
}

impl From<TransportError> for ProxyError {
    fn from(e: TransportError) -> Self {
        ProxyError::Transport(e)
    }
}

impl From<FrameError> for ProxyError {
    fn from(e: FrameError) -> Self {
        ProxyError::Frame(e)
    }
}

impl From<OscError> for ProxyError {
    fn from(e: OscError) -> Self {
        ProxyError::Encode(e)
    }
}

impl core::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProxyError::Transport(e) => write!(f, "{}", e),
            ProxyError::Frame(e) => write!(f, "{}", e),
            ProxyError::Encode(e) => write!(f, "Encode failed: {}", e),
            ProxyError::Closed => write!(f, "Proxy client closed"),
        }
    }
}
