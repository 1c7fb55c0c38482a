//! OscProxyClient wasm-bindgen エクスポート
//!
//! JS の WebSocket（または任意のバイト送信関数）と osc-proxy をつなぐ主エントリポイント。

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Function, Uint8Array};
use wasm_bindgen::prelude::*;

use osc_codec::{Argument, Message, Packet};
use osc_proxy::{PacketHandler, ProxyClient, ProxyConfig, ProxyError, Transport, TransportError};

/// JS の送信関数をトランスポートとして使う
struct JsTransport {
    send_fn: Function,
}

impl Transport for JsTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let arr = to_uint8_array(bytes);
        self.send_fn
            .call1(&JsValue::NULL, &arr)
            .map(|_| ())
            .map_err(|e| TransportError::WriteFailed(format!("{:?}", e)))
    }
}

/// 受信パケットを `recvChunk` の戻り値用に貯め、エラーを JS に通知する
struct JsHandler {
    received: Vec<Packet>,
    on_error: Option<Function>,
}

impl PacketHandler for JsHandler {
    fn on_packet(&mut self, packet: Packet) {
        self.received.push(packet);
    }

    fn on_error(&mut self, error: ProxyError) {
        self.notify(&format!("{}", error));
    }
}

impl JsHandler {
    fn notify(&self, message: &str) {
        if let Some(f) = &self.on_error {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(message)) {
                log::warn!("onError callback threw: {:?}", e);
            }
        }
    }
}

/// OSC プロキシクライアント
///
/// ## 内部アーキテクチャ
///
/// ```text
/// OscProxyClient
///   └── ProxyClient      (osc-proxy)
///         ├── JsTransport      - JS の sendFn を呼ぶ
///         ├── StreamAssembler  (osc-transport) - 受信チャンクの再組み立て
///         └── JsHandler        - 受信 Packet を貯め、エラーを onErrorFn に渡す
/// ```
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため、`!Send + !Sync` を満たす。
/// JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct OscProxyClient {
    inner: ProxyClient<JsTransport, JsHandler>,
}

#[wasm_bindgen]
impl OscProxyClient {
    /// クライアントを初期化する
    ///
    /// # 引数
    /// - `send_fn`: `(bytes: Uint8Array) => void`。例外を投げると送信失敗として扱う。
    /// - `config_json`: `ProxyConfig` の JSON。省略時はデフォルト（FramedTransport）。
    ///   例: `'{"mode":"length_prefixed_stream","max_depth":8}'`
    /// - `on_error_fn`: `(message: string) => void`。破棄したフレームなどを通知する。
    ///
    /// # エラー
    /// - 設定 JSON の解釈に失敗
    #[wasm_bindgen(constructor)]
    pub fn new(
        send_fn: Function,
        config_json: Option<String>,
        on_error_fn: Option<Function>,
    ) -> Result<OscProxyClient, JsError> {
        let config = match config_json.as_deref() {
            Some(json) => serde_json::from_str::<ProxyConfig>(json)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?,
            None => ProxyConfig::default(),
        };

        let transport = JsTransport { send_fn };
        let handler = JsHandler {
            received: Vec::new(),
            on_error: on_error_fn,
        };
        Ok(OscProxyClient {
            inner: ProxyClient::new(transport, handler, config),
        })
    }

    /// トランスポートから届いたバイト列を処理する
    ///
    /// # 引数
    /// - `bytes`: WebSocket の `message` イベントのデータを Uint8Array にしたもの
    ///
    /// # 戻り値
    /// 揃ったパケットの JSON 文字列の配列（到着順）。まだ揃っていなければ空配列。
    /// 不正なフレームや JSON にできなかったパケットは飛ばし、`onErrorFn` に通知する。
    #[wasm_bindgen(js_name = "recvChunk")]
    pub fn recv_chunk(&mut self, bytes: &[u8]) -> js_sys::Array {
        self.inner.on_chunk(bytes);
        let handler = self.inner.handler_mut();
        let packets = core::mem::take(&mut handler.received);

        let result = js_sys::Array::new();
        let encoded = to_json_each(&packets, |message| {
            log::warn!("{}", message);
            handler.notify(&message);
        });
        for json in &encoded {
            result.push(&JsValue::from_str(json));
        }
        result
    }

    /// JSON 形式のパケットを送信する
    ///
    /// # エラー
    /// - JSON が Packet として解釈できない
    /// - クライアントが閉じている、または `sendFn` が例外を投げた
    #[wasm_bindgen(js_name = "sendPacket")]
    pub fn send_packet(&mut self, json: &str) -> Result<(), JsError> {
        let packet = packet_from_json(json)?;
        self.send(&packet)
    }

    /// メッセージを 1 個組み立てて送信する
    ///
    /// # 引数
    /// - `address`: OSC アドレス（例: `"/test/1"`）
    /// - `args_json`: 引数の JSON 配列（例: `'[{"type":"int","value":42}]'`）。省略時は引数なし。
    ///
    /// # エラー
    /// - アドレス不正、引数 JSON の解釈に失敗
    /// - クライアントが閉じている、または `sendFn` が例外を投げた
    #[wasm_bindgen(js_name = "sendMessage")]
    pub fn send_message(&mut self, address: &str, args_json: Option<String>) -> Result<(), JsError> {
        let mut message = Message::new(address)
            .map_err(|e| JsError::new(&format!("Invalid message: {}", e)))?;
        if let Some(json) = args_json.as_deref() {
            message.args = serde_json::from_str::<Vec<Argument>>(json)
                .map_err(|e| JsError::new(&format!("Invalid arguments: {}", e)))?;
        }
        self.send(&Packet::from(message))
    }

    /// クライアントを閉じる（WebSocket の `close` イベントで呼ぶ）
    ///
    /// 受信途中のデータは破棄される。
    #[wasm_bindgen]
    pub fn close(&mut self) {
        self.inner.close();
    }

    #[wasm_bindgen(js_name = "isOpen")]
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// 統計を JSON 文字列で返す
    ///
    /// # 戻り値
    /// ```json
    /// {
    ///   "packets_received": 12,
    ///   "packets_sent": 3,
    ///   "bytes_received": 480,
    ///   "bytes_sent": 96,
    ///   "frames_discarded": 0
    /// }
    /// ```
    #[wasm_bindgen(js_name = "getStats")]
    pub fn get_stats(&self) -> Result<String, JsError> {
        to_json(&self.inner.stats())
    }
}

impl OscProxyClient {
    fn send(&mut self, packet: &Packet) -> Result<(), JsError> {
        self.inner
            .send_packet(packet)
            .map_err(|e| JsError::new(&format!("Send failed: {}", e)))
    }
}

/// JSON 文字列を Packet に変換する
pub(crate) fn packet_from_json(json: &str) -> Result<Packet, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("Invalid packet JSON: {}", e)))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("JSON encode failed: {}", e)))
}

/// 値を 1 個ずつ JSON にする
///
/// 失敗した値は結果から外し、理由を `on_failure` に渡す。残りの値はそのまま続ける。
pub(crate) fn to_json_each<T: serde::Serialize>(
    values: &[T],
    mut on_failure: impl FnMut(String),
) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::to_string(value) {
            Ok(json) => Some(json),
            Err(e) => {
                on_failure(format!("JSON encode failed for packet {}: {}", i, e));
                None
            }
        })
        .collect()
}

pub(crate) fn to_uint8_array(bytes: &[u8]) -> Uint8Array {
    let arr = Uint8Array::new_with_length(bytes.len() as u32);
    arr.copy_from(bytes);
    arr
}
