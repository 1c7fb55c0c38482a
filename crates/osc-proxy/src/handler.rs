//! 受信パケットの通知先

use alloc::vec::Vec;

use osc_codec::Packet;

use crate::error::ProxyError;

/// ProxyClient が受信パケットとエラーを渡す相手
pub trait PacketHandler {
    /// 完全なパケットを 1 個受け取る（到着順）
    fn on_packet(&mut self, packet: Packet);

    /// 破棄したフレームやトランスポートの障害を受け取る
    ///
    /// デフォルトでは何もしない（ログは ProxyClient 側で出している）。
    fn on_error(&mut self, _error: ProxyError) {}
}

impl<H: PacketHandler + ?Sized> PacketHandler for &mut H {
    fn on_packet(&mut self, packet: Packet) {
        (**self).on_packet(packet)
    }

    fn on_error(&mut self, error: ProxyError) {
        (**self).on_error(error)
    }
}

/// 受け取ったものをそのまま貯めておくハンドラ
#[derive(Debug, Default)]
pub struct PacketCollector {
    pub packets: Vec<Packet>,
    pub errors: Vec<ProxyError>,
}

impl PacketCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 貯まったパケットを取り出す
    pub fn take_packets(&mut self) -> Vec<Packet> {
        core::mem::take(&mut self.packets)
    }

    /// 貯まったエラーを取り出す
    pub fn take_errors(&mut self) -> Vec<ProxyError> {
        core::mem::take(&mut self.errors)
    }
}

impl PacketHandler for PacketCollector {
    fn on_packet(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    fn on_error(&mut self, error: ProxyError) {
        self.errors.push(error);
    }
}
