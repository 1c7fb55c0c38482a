//! ProxyClient 本体
//!
//! トランスポート 1 本と StreamAssembler 1 個を排他的に所有する。
//! 受信チャンクは到着順に処理され、同じインスタンスを複数スレッドから
//! 同時に操作することはできない（`&mut self`）。

use alloc::vec::Vec;

use osc_codec::Packet;
use osc_transport::{encode_frame, FramingMode, StreamAssembler, Transport, TransportError};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::handler::PacketHandler;

/// ProxyClient の統計情報
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProxyStats {
    /// ハンドラに渡したパケット数
    pub packets_received: u64,
    /// 送信したパケット数
    pub packets_sent: u64,
    /// on_chunk で受け取ったバイト数
    pub bytes_received: u64,
    /// トランスポートに書き込んだバイト数
    pub bytes_sent: u64,
    /// デコードできずに破棄したフレーム数
    pub frames_discarded: u64,
}

/// OSC プロキシクライアント
///
/// ## 内部構成
///
/// ```text
/// ProxyClient
///   ├── Transport        (osc-transport) - 送信先
///   ├── StreamAssembler  (osc-transport) - 受信チャンク → Packet
///   └── PacketHandler    (osc-proxy)     - 受信 Packet の通知先
/// ```
pub struct ProxyClient<T: Transport, H: PacketHandler> {
    transport: T,
    handler: H,
    assembler: StreamAssembler,
    mode: FramingMode,
    open: bool,
    stats: ProxyStats,
}

impl<T: Transport, H: PacketHandler> ProxyClient<T, H> {
    /// クライアントを生成する
    ///
    /// # 引数
    /// - `transport`: 送信先（接続済みであること）
    /// - `handler`: 受信パケットとエラーの通知先
    /// - `config`: フレーミング方式と受信側の上限
    pub fn new(transport: T, handler: H, config: ProxyConfig) -> Self {
        log::debug!("proxy client opened (mode {:?})", config.mode());
        ProxyClient {
            transport,
            handler,
            assembler: StreamAssembler::new(config.assembler),
            mode: config.mode(),
            open: true,
            stats: ProxyStats::default(),
        }
    }

    /// トランスポートから届いたチャンクを処理する
    ///
    /// 揃ったパケットは到着順に `PacketHandler::on_packet` へ、
    /// 破棄したフレームは `PacketHandler::on_error` へ渡す。
    /// 閉じた後に呼ばれた場合は何もしない。
    ///
    /// # 戻り値
    /// このチャンクでハンドラに渡したパケット数
    pub fn on_chunk(&mut self, chunk: &[u8]) -> usize {
        if !self.open {
            log::debug!("ignoring {}-byte chunk after close", chunk.len());
            return 0;
        }
        self.stats.bytes_received += chunk.len() as u64;

        let mut delivered = 0;
        for result in self.assembler.feed(chunk) {
            match result {
                Ok(packet) => {
                    delivered += 1;
                    self.handler.on_packet(packet);
                }
                Err(e) => {
                    self.stats.frames_discarded += 1;
                    self.handler.on_error(ProxyError::Frame(e));
                }
            }
        }
        self.stats.packets_received += delivered as u64;
        delivered
    }

    /// パケットを 1 個送信する
    ///
    /// フレーミング方式に従ってエンコードし、トランスポートに 1 回で書き込む。
    ///
    /// # エラー
    /// - `ProxyError::Closed`: 閉じた後に呼ばれた
    /// - `ProxyError::Encode`: パケットをエンコードできない（何も書き込まない）
    /// - `ProxyError::Transport`: 書き込み失敗（再送はしない）
    pub fn send_packet(&mut self, packet: &Packet) -> Result<(), ProxyError> {
        self.send_all(core::slice::from_ref(packet))
    }

    /// 複数のパケットをまとめて送信する
    ///
    /// `LengthPrefixedStream` では全パケットを 1 回の書き込みに連結する。
    /// `FramedTransport` ではパケットごとに 1 回書き込み、途中で失敗したらそこで止める。
    /// `LengthPrefixedStream` でエンコードに失敗したパケットがあれば、1 個も書き込まない。
    pub fn send_packets(&mut self, packets: &[Packet]) -> Result<(), ProxyError> {
        self.send_all(packets)
    }

    /// トランスポート側の障害を通知する
    ///
    /// ハンドラに渡してからクライアントを閉じる。
    pub fn on_transport_error(&mut self, error: TransportError) {
        log::warn!("transport error: {}", error);
        self.handler.on_error(ProxyError::Transport(error));
        self.close();
    }

    /// クライアントを閉じ、受信途中のデータを破棄する
    ///
    /// 途中まで届いていたフレームは復元できない。2 回目以降の呼び出しは何もしない。
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        if self.assembler.buffered_len() > 0 {
            log::debug!(
                "closing with {} buffered bytes discarded",
                self.assembler.buffered_len()
            );
        }
        self.assembler.reset();
        self.open = false;
        log::debug!("proxy client closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    pub fn stats(&self) -> ProxyStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// トランスポートとハンドラを返してクライアントを破棄する
    pub fn into_parts(self) -> (T, H) {
        (self.transport, self.handler)
    }

    // ===== Private メソッド =====

    fn send_all(&mut self, packets: &[Packet]) -> Result<(), ProxyError> {
        if !self.open {
            return Err(ProxyError::Closed);
        }
        if packets.is_empty() {
            return Ok(());
        }

        match self.mode {
            FramingMode::LengthPrefixedStream => {
                let mut out = Vec::new();
                for packet in packets {
                    encode_frame(self.mode, packet, &mut out)?;
                }
                self.write(&out, packets.len())
            }
            FramingMode::FramedTransport => {
                let mut out = Vec::new();
                for packet in packets {
                    out.clear();
                    encode_frame(self.mode, packet, &mut out)?;
                    self.write(&out, 1)?;
                }
                Ok(())
            }
        }
    }

    fn write(&mut self, bytes: &[u8], packet_count: usize) -> Result<(), ProxyError> {
        match self.transport.send(bytes) {
            Ok(()) => {
                self.stats.packets_sent += packet_count as u64;
                self.stats.bytes_sent += bytes.len() as u64;
                log::trace!("sent {} packet(s), {} bytes", packet_count, bytes.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("send failed: {}", e);
                Err(ProxyError::Transport(e))
            }
        }
    }
}
