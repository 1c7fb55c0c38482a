//! # osc-wasm
//!
//! wasm-bindgen エクスポート：ブラウザ / Node.js の WebSocket から呼び出す公開 API。
//!
//! パケットは JSON 文字列で受け渡す。形式は `osc_codec::Packet` の serde 表現:
//!
//! ```json
//! { "kind": "message", "address": "/test/1",
//!   "args": [{ "type": "int", "value": 42 }, { "type": "string", "value": "hi" }] }
//!
//! { "kind": "bundle", "timetag": { "seconds": 2231452800, "fraction": 0 },
//!   "elements": [ ... ] }
//! ```
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { OscProxyClient, init_panic_hook, init_logger } from '../osc-wasm-pkg/osc_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//! init_logger("debug");
//!
//! const ws = new WebSocket("ws://localhost:8081");
//! ws.binaryType = "arraybuffer";
//!
//! // クライアント初期化（送信関数、設定 JSON、エラー通知）
//! const client = new OscProxyClient(
//!     (bytes: Uint8Array) => ws.send(bytes),
//!     '{"mode":"framed_transport"}',
//!     (err: string) => console.warn(err),
//! );
//!
//! // 受信データを処理
//! ws.onmessage = (ev) => {
//!     for (const json of client.recvChunk(new Uint8Array(ev.data))) {
//!         const packet = JSON.parse(json);
//!         // ...
//!     }
//! };
//!
//! // 送信
//! client.sendMessage("/test/1", '[{"type":"int","value":42}]');
//! ws.onclose = () => client.close();
//! ```

extern crate alloc;

use alloc::format;
use alloc::string::String;

use wasm_bindgen::prelude::*;

use osc_codec::Packet;

pub mod client;
pub mod logger;

pub use client::OscProxyClient;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Rust 側のログをブラウザコンソールに出力する
///
/// # 引数
/// - `level`: `"error"` / `"warn"` / `"info"` / `"debug"` / `"trace"` / `"off"`。省略時は `"warn"`。
///
/// # エラー
/// - 不明なレベル名
#[wasm_bindgen]
pub fn init_logger(level: Option<String>) -> Result<(), JsError> {
    logger::init(level.as_deref().unwrap_or(logger::DEFAULT_LEVEL))
        .map_err(|e| JsError::new(&format!("Invalid log level: {}", e)))
}

/// JSON 形式のパケットを OSC バイナリにエンコードする
///
/// # エラー
/// - JSON が Packet として解釈できない（アドレス不正を含む）
/// - NUL を含む文字列など、OSC で表現できない引数がある
#[wasm_bindgen(js_name = "encodePacket")]
pub fn encode_packet(json: &str) -> Result<js_sys::Uint8Array, JsError> {
    let packet = client::packet_from_json(json)?;
    let bytes = packet
        .to_bytes()
        .map_err(|e| JsError::new(&format!("Packet encode failed: {}", e)))?;
    Ok(client::to_uint8_array(&bytes))
}

/// OSC バイナリ 1 パケット分を JSON 文字列にデコードする
///
/// # エラー
/// - OSC パケットとして不正
#[wasm_bindgen(js_name = "decodePacket")]
pub fn decode_packet(bytes: &[u8]) -> Result<String, JsError> {
    let packet = Packet::from_bytes(bytes)
        .map_err(|e| JsError::new(&format!("Packet decode failed: {}", e)))?;
    client::to_json(&packet)
}
