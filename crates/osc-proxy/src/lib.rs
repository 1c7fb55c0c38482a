//! # osc-proxy
//!
//! トランスポート接続 1 本を OSC パケットの送受信に変換する薄いクライアント。
//!
//! ## データフロー
//!
//! ```text
//! 受信: Transport チャンク → on_chunk → StreamAssembler → Packet → PacketHandler
//! 送信: Packet → send_packet → encode_frame → Transport::send
//! ```
//!
//! 接続の確立・再接続・切断はトランスポート側の責任。`ProxyClient` は
//! 閉じられたことを `close` / `on_transport_error` で知らされるだけ。
//!
//! ## 例
//!
//! ```
//! use osc_codec::{Message, Packet};
//! use osc_proxy::{PacketCollector, ProxyClient, ProxyConfig};
//!
//! let mut client = ProxyClient::new(Vec::<Vec<u8>>::new(), PacketCollector::new(), ProxyConfig::default());
//! let packet = Packet::from(Message::new("/ping").unwrap());
//! client.send_packet(&packet).unwrap();
//!
//! // 相手から同じバイト列が届いたとする
//! let sent = client.transport()[0].clone();
//! client.on_chunk(&sent);
//! assert_eq!(client.handler().packets, vec![packet]);
//! ```

#![no_std]
extern crate alloc;

pub mod client;
pub mod config;
pub mod error;
pub mod handler;

pub use client::{ProxyClient, ProxyStats};
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use handler::{PacketCollector, PacketHandler};

pub use osc_transport::{FramingMode, Transport, TransportError};
