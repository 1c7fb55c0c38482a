//! バイト列を先頭から読み進めるカーソル
//!
//! すべての読み取りは境界チェックを行い、足りない場合は何も消費せずに `None` を返す。
//! どのエラーに変換するかは呼び出し側（引数・メッセージ・バンドル）が決める。

use crate::pad4;

/// 借用したバイト列に対する読み取りカーソル
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// バイト列の先頭からカーソルを作る
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    /// 現在位置（先頭からのバイト数）
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 残りのバイト数
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// 残りがないか
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 消費せずに残りのバイト列を返す
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// `n` バイトを切り出して進める
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Some(slice)
    }

    /// 固定長配列として `N` バイト読む
    pub fn take_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let slice = self.take(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(slice);
        Some(arr)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.take_array::<4>().map(u32::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.take_array::<4>().map(i32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        self.take_array::<8>().map(u64::from_be_bytes)
    }

    /// NUL 終端 + 4 バイト境界パディングの文字列を読む
    ///
    /// # 戻り値
    /// - `Some(bytes)`: NUL より前のバイト列（パディング分まで消費済み）
    /// - `None`: NUL が見つからない、またはパディングが途中で切れている
    ///
    /// 失敗時はカーソルを動かさない。
    pub fn read_padded_str(&mut self) -> Option<&'a [u8]> {
        let rest = self.peek_rest();
        let nul = rest.iter().position(|&b| b == 0)?;
        // NUL 込みで 4 バイト境界まで
        let total = pad4(nul + 1);
        if total > rest.len() {
            return None;
        }
        self.pos += total;
        Some(&rest[..nul])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_numbers_big_endian() {
        let bytes = [0, 0, 0, 42, 0xFF, 0xFF, 0xFF, 0xFE, 0, 0, 0, 0, 0, 0, 0, 1];
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u32(), Some(42));
        assert_eq!(r.read_i32(), Some(-2));
        assert_eq!(r.read_u64(), Some(1));
        assert!(r.is_empty());
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let bytes = [1, 2, 3];
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u32(), None);
        assert_eq!(r.position(), 0);
        assert_eq!(r.take(3), Some(&bytes[..]));
    }

    #[test]
    fn test_padded_str() {
        let bytes = b"/abc\0\0\0\0,i\0\0";
        let mut r = Reader::new(bytes);
        assert_eq!(r.read_padded_str(), Some(&b"/abc"[..]));
        assert_eq!(r.position(), 8);
        assert_eq!(r.read_padded_str(), Some(&b",i"[..]));
        assert!(r.is_empty());
    }

    #[test]
    fn test_padded_str_missing_padding() {
        // NUL はあるが 4 バイト境界までのパディングが足りない
        let bytes = b"/abc\0";
        let mut r = Reader::new(bytes);
        assert_eq!(r.read_padded_str(), None);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_padded_str_unterminated() {
        let mut r = Reader::new(b"/abcdefg");
        assert_eq!(r.read_padded_str(), None);
    }
}
