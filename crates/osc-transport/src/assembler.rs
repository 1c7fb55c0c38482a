//! 受信バイト列から OSC パケットを再組み立てする状態機械
//!
//! ## 状態遷移
//!
//! ```text
//! LengthPrefixedStream:
//!   AwaitingLength ──(4 バイト揃う)──▶ AwaitingBody(len) ──(len バイト揃う)──▶ AwaitingLength
//!
//! FramedTransport:
//!   AwaitingFrame（チャンク 1 個 = フレーム 1 個）
//! ```
//!
//! ## 不正フレームの扱い
//!
//! デコードに失敗したフレームは破棄して初期状態に戻る（discard-and-reset）。
//! 長さプレフィックス自体が壊れている場合、以降のバイトを誤って解釈する可能性がある。
//! 次のフレーム境界を推測して探すことはしない。

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use osc_codec::{Packet, DEFAULT_MAX_DEPTH};

use crate::error::FrameError;
use crate::framing::FramingMode;
use crate::{DEFAULT_MAX_FRAME_LEN, LENGTH_PREFIX_LEN};

/// StreamAssembler の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AssemblerConfig {
    /// フレーミング方式
    pub mode: FramingMode,
    /// 1 フレームの最大バイト数（LengthPrefixedStream のみ）
    pub max_frame_len: usize,
    /// バンドルの入れ子の最大深さ
    pub max_depth: usize,
}

impl AssemblerConfig {
    pub fn new(mode: FramingMode) -> Self {
        AssemblerConfig {
            mode,
            ..Self::default()
        }
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            mode: FramingMode::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// 再組み立ての状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// 長さプレフィックス待ち
    AwaitingLength,
    /// 本体待ち（長さは確定済み）
    AwaitingBody(usize),
    /// チャンク待ち（FramedTransport）
    AwaitingFrame,
}

impl AssemblerState {
    fn initial(mode: FramingMode) -> Self {
        match mode {
            FramingMode::FramedTransport => AssemblerState::AwaitingFrame,
            FramingMode::LengthPrefixedStream => AssemblerState::AwaitingLength,
        }
    }
}

/// 受信チャンクを OSC パケットに再組み立てするクラス
///
/// バッファはこのインスタンスが排他的に所有する。`&mut self` を要求するため、
/// 複数スレッドから同時に `feed` することはできない（到着順に処理される）。
pub struct StreamAssembler {
    config: AssemblerConfig,
    state: AssemblerState,
    /// LengthPrefixedStream の受信バッファ
    buffer: Vec<u8>,
    /// `buffer` 内の未処理データの先頭
    cursor: usize,
    /// FramedTransport の未処理チャンク
    frames: VecDeque<Vec<u8>>,
}

impl StreamAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        StreamAssembler {
            state: AssemblerState::initial(config.mode),
            config,
            buffer: Vec::new(),
            cursor: 0,
            frames: VecDeque::new(),
        }
    }

    /// 受信チャンクを追加し、揃ったパケットを順に返すイテレータを返す
    ///
    /// イテレータは遅延評価で、このチャンクまでに揃ったフレームの分だけ要素を返す。
    /// 途中で捨てても残りはバッファに残り、次の `feed` / `pending` で続きから取り出せる。
    /// 末尾の不完全なフレームは次のチャンクが来るまで保持する。
    ///
    /// # 戻り値
    /// `Result<Packet, FrameError>` のイテレータ。エラーのフレームは破棄済み。
    pub fn feed(&mut self, chunk: &[u8]) -> Packets<'_> {
        match self.state {
            AssemblerState::AwaitingFrame => {
                if chunk.is_empty() {
                    log::trace!("ignoring empty chunk");
                } else {
                    self.frames.push_back(chunk.to_vec());
                }
            }
            _ => {
                self.compact();
                self.buffer.extend_from_slice(chunk);
            }
        }
        Packets { assembler: self }
    }

    /// 新しいバイト列を追加せずに、揃っているパケットを取り出す
    pub fn pending(&mut self) -> Packets<'_> {
        Packets { assembler: self }
    }

    /// バッファを解放して初期状態に戻す
    pub fn reset(&mut self) {
        self.state = AssemblerState::initial(self.config.mode);
        self.buffer = Vec::new();
        self.cursor = 0;
        self.frames.clear();
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// 未処理のバイト数
    pub fn buffered_len(&self) -> usize {
        (self.buffer.len() - self.cursor) + self.frames.iter().map(Vec::len).sum::<usize>()
    }

    /// 次のパケットを 1 個取り出す（揃っていなければ `None`）
    fn next_packet(&mut self) -> Option<Result<Packet, FrameError>> {
        loop {
            match self.state {
                AssemblerState::AwaitingFrame => {
                    let frame = self.frames.pop_front()?;
                    return Some(self.decode_frame(&frame));
                }
                AssemblerState::AwaitingLength => {
                    let prefix = self.unread().get(..LENGTH_PREFIX_LEN)?;
                    let mut len_bytes = [0u8; LENGTH_PREFIX_LEN];
                    len_bytes.copy_from_slice(prefix);
                    let len = u32::from_be_bytes(len_bytes) as usize;
                    self.cursor += LENGTH_PREFIX_LEN;

                    if len > self.config.max_frame_len {
                        let max = self.config.max_frame_len;
                        log::warn!(
                            "frame length {} exceeds max {}, discarding {} buffered bytes",
                            len,
                            max,
                            self.buffered_len()
                        );
                        self.reset();
                        return Some(Err(FrameError::FrameTooLarge { len, max }));
                    }
                    self.state = AssemblerState::AwaitingBody(len);
                }
                AssemblerState::AwaitingBody(len) => {
                    if self.unread().len() < len {
                        return None;
                    }
                    let start = self.cursor;
                    self.cursor += len;
                    self.state = AssemblerState::AwaitingLength;

                    let result = Packet::from_bytes_with_depth(
                        &self.buffer[start..start + len],
                        self.config.max_depth,
                    );
                    if self.cursor == self.buffer.len() {
                        self.buffer.clear();
                        self.cursor = 0;
                    }
                    return Some(self.finish_frame(len, result));
                }
            }
        }
    }

    fn decode_frame(&self, frame: &[u8]) -> Result<Packet, FrameError> {
        let result = Packet::from_bytes_with_depth(frame, self.config.max_depth);
        self.finish_frame(frame.len(), result)
    }

    fn finish_frame(
        &self,
        len: usize,
        result: Result<Packet, osc_codec::OscError>,
    ) -> Result<Packet, FrameError> {
        match result {
            Ok(packet) => {
                log::trace!("assembled {}-byte frame", len);
                Ok(packet)
            }
            Err(e) => {
                log::warn!("discarding malformed {}-byte frame: {}", len, e);
                Err(FrameError::Decode(e))
            }
        }
    }

    fn unread(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    /// 処理済みの先頭部分を詰める
    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}

/// `StreamAssembler::feed` が返す、揃ったパケットのイテレータ
pub struct Packets<'a> {
    assembler: &'a mut StreamAssembler,
}

impl Iterator for Packets<'_> {
    type Item = Result<Packet, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_packet()
    }
}
