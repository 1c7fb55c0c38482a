//! トランスポートの送信側インターフェース
//!
//! 接続の確立・再接続・切断はトランスポート側の責任。
//! ここでは「バイト列を 1 回書き込む」能力だけを要求する。

use alloc::vec::Vec;

use crate::error::TransportError;

/// バイト列を相手に送る能力
///
/// WebSocket なら 1 回の `send` が 1 メッセージ、TCP なら単なる書き込みになる。
pub trait Transport {
    /// バイト列を送信する
    ///
    /// # エラー
    /// - `TransportError`: 書き込み失敗（呼び出し側に伝播し、再送はしない）
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }
}

/// 送信したバイト列をそのまま貯めるだけのトランスポート
///
/// JS 側に送信データを返す WASM バインディングやテストで使う。
impl Transport for Vec<Vec<u8>> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.push(bytes.to_vec());
        Ok(())
    }
}
