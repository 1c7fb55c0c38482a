//! # osc-transport
//!
//! バイト指向トランスポート上の OSC フレーミングと再組み立て。
//!
//! トランスポートには 2 種類ある:
//!
//! - **FramedTransport**: 受信チャンク 1 個がそのまま OSC パケット 1 個
//!   （UDP データグラム、WebSocket メッセージ）
//! - **LengthPrefixedStream**: 区切りのないバイトストリーム。各パケットの前に
//!   4 バイトの長さが付く（OSC over TCP の慣習）
//!
//! ## LengthPrefixedStream の Wire Format
//!
//! ```text
//! [length: u32 BE (4 bytes)][OSC packet (length bytes)]
//! [length: u32 BE (4 bytes)][OSC packet (length bytes)]
//! ...
//! ```
//!
//! チャンクの境界とパケットの境界は一致しない。`StreamAssembler` が
//! 途中までのデータを保持し、揃ったフレームから順にデコードする。

#![no_std]
extern crate alloc;

pub mod assembler;
pub mod error;
pub mod framing;
pub mod transport;

pub use assembler::{AssemblerConfig, AssemblerState, Packets, StreamAssembler};
pub use error::{FrameError, TransportError};
pub use framing::{encode_frame, encode_stream, frame_bytes, FramingMode};
pub use transport::Transport;

/// 長さプレフィックスのバイト数
pub const LENGTH_PREFIX_LEN: usize = 4;

/// 1 フレームの最大バイト数（デフォルト 1 MiB）
///
/// これを超える長さプレフィックスを受け取った場合、ストリームが壊れているとみなして
/// バッファ全体を破棄する。
pub const DEFAULT_MAX_FRAME_LEN: usize = 1 << 20;
