//! # osc-codec
//!
//! OSC 1.0 (Open Sound Control) のバイナリコーデック。
//!
//! メッセージ・バンドル（入れ子を含む）・タイムタグのエンコード/デコードを担当する。
//! `no_std` + `alloc` 環境（WASM を含む）で動作する。
//!
//! ## Message の Wire Format
//!
//! ```text
//! [address: "/foo/bar\0" + 4バイト境界までゼロパディング]
//! [type tags: ",if s\0"  + 4バイト境界までゼロパディング]
//! [argument payloads: 各引数ごとに 4バイト境界に揃える]
//! ```
//!
//! ## Bundle の Wire Format
//!
//! ```text
//! ["#bundle\0": 8 bytes][timetag: u64 BE (8 bytes)]
//! 繰り返し: [element length: u32 BE (4 bytes)][element bytes (Message or Bundle)]
//! ```
//!
//! ## 使用例
//!
//! ```
//! use osc_codec::{Bundle, Message, Packet};
//!
//! let mut msg = Message::new("/test/1").unwrap();
//! msg.push(42).push(14);
//! assert_eq!(msg.to_bytes().unwrap().len(), 20);
//!
//! let mut bundle = Bundle::new();
//! bundle.push(msg).push(Message::new("/test/2").unwrap());
//!
//! let bytes = Packet::from(bundle.clone()).to_bytes().unwrap();
//! assert_eq!(Packet::from_bytes(&bytes).unwrap(), Packet::Bundle(bundle));
//! ```

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod address;
pub mod argument;
pub mod bundle;
pub mod codec;
pub mod error;
pub mod message;
pub mod packet;
pub mod reader;
pub mod timetag;

pub use address::AddressPattern;
pub use argument::{Argument, MidiMessage, Rgba};
pub use bundle::Bundle;
pub use error::{AddressError, ArgumentError, BundleError, MessageError, OscError};
pub use message::Message;
pub use packet::{Messages, Packet};
pub use timetag::TimeTag;

/// バンドル先頭のマーカー（NUL 終端込みで 8 バイト）
pub const BUNDLE_MARKER: &[u8; 8] = b"#bundle\0";

/// バンドルの入れ子の最大深さ（デフォルト）
///
/// 最上位のバンドルを深さ 1 とする。悪意のある入力による
/// スタック枯渇を防ぐため、これを超える入れ子はデコード時にエラーとなる。
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// NTP エポック（1900-01-01）から Unix エポック（1970-01-01）までの秒数
/// = 70 年 + 17 閏日
pub const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// OSC の 4 バイト境界に切り上げたバイト数を返す
#[inline]
pub(crate) const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}
