//! OSC の型付き引数

use alloc::string::String;
use alloc::vec::Vec;

use crate::timetag::TimeTag;

/// OSC メッセージの引数 1 個
///
/// 型タグ文字がデコード経路を一意に決める。
///
/// | 型タグ | バリアント | ペイロード |
/// |---|---|---|
/// | `i` | `Int` | i32 BE (4 bytes) |
/// | `f` | `Float` | f32 BE (4 bytes) |
/// | `s` | `String` | NUL 終端 + 4 バイト境界パディング |
/// | `b` | `Blob` | i32 BE 長さ + バイト列 + パディング |
/// | `h` | `Long` | i64 BE (8 bytes) |
/// | `d` | `Double` | f64 BE (8 bytes) |
/// | `t` | `TimeTag` | u64 BE (8 bytes) |
/// | `S` | `Symbol` | `s` と同じ |
/// | `c` | `Char` | u32 BE (4 bytes) |
/// | `r` | `Color` | RGBA 各 1 バイト (4 bytes) |
/// | `m` | `Midi` | port, status, data1, data2 (4 bytes) |
/// | `T` `F` `N` `I` | `True` `False` `Nil` `Impulse` | なし |
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "snake_case"))]
pub enum Argument {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    TimeTag(TimeTag),
    Symbol(String),
    Char(char),
    Color(Rgba),
    Midi(MidiMessage),
    True,
    False,
    Nil,
    Impulse,
}

/// `r` 型の 32 ビット RGBA カラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// `m` 型の 4 バイト MIDI メッセージ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MidiMessage {
    pub port: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl Argument {
    /// この引数の型タグ文字
    pub fn tag(&self) -> char {
        match self {
            Argument::Int(_) => 'i',
            Argument::Float(_) => 'f',
            Argument::String(_) => 's',
            Argument::Blob(_) => 'b',
            Argument::Long(_) => 'h',
            Argument::Double(_) => 'd',
            Argument::TimeTag(_) => 't',
            Argument::Symbol(_) => 'S',
            Argument::Char(_) => 'c',
            Argument::Color(_) => 'r',
            Argument::Midi(_) => 'm',
            Argument::True => 'T',
            Argument::False => 'F',
            Argument::Nil => 'N',
            Argument::Impulse => 'I',
        }
    }

    /// ペイロードのバイト数（パディング込み）
    pub fn payload_len(&self) -> usize {
        match self {
            Argument::Int(_)
            | Argument::Float(_)
            | Argument::Char(_)
            | Argument::Color(_)
            | Argument::Midi(_) => 4,
            Argument::Long(_) | Argument::Double(_) | Argument::TimeTag(_) => 8,
            Argument::String(s) | Argument::Symbol(s) => crate::pad4(s.len() + 1),
            Argument::Blob(b) => 4 + crate::pad4(b.len()),
            Argument::True | Argument::False | Argument::Nil | Argument::Impulse => 0,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Argument::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Argument::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// `s` または `S` の文字列
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) | Argument::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Argument::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// `T` / `F` の真偽値
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::True => Some(true),
            Argument::False => Some(false),
            _ => None,
        }
    }
}

// 型指定なしの push で型を推論する（整数 → i、浮動小数 → f、バイト列 → b、文字列 → s）
// f64 からの From は持たない（`push(1.5)` は f32 になる）。`d` は `Argument::Double` で明示する

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int(v)
    }
}

impl From<f32> for Argument {
    fn from(v: f32) -> Self {
        Argument::Float(v)
    }
}

impl From<i64> for Argument {
    fn from(v: i64) -> Self {
        Argument::Long(v)
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::String(String::from(v))
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::String(v)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(v: Vec<u8>) -> Self {
        Argument::Blob(v)
    }
}

impl From<&[u8]> for Argument {
    fn from(v: &[u8]) -> Self {
        Argument::Blob(v.to_vec())
    }
}

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        if v {
            Argument::True
        } else {
            Argument::False
        }
    }
}

impl From<char> for Argument {
    fn from(v: char) -> Self {
        Argument::Char(v)
    }
}

impl From<TimeTag> for Argument {
    fn from(v: TimeTag) -> Self {
        Argument::TimeTag(v)
    }
}

impl From<Rgba> for Argument {
    fn from(v: Rgba) -> Self {
        Argument::Color(v)
    }
}

impl From<MidiMessage> for Argument {
    fn from(v: MidiMessage) -> Self {
        Argument::Midi(v)
    }
}

impl core::fmt::Display for Argument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Argument::Int(v) => write!(f, "{}", v),
            Argument::Float(v) => write!(f, "{}", v),
            Argument::String(s) | Argument::Symbol(s) => write!(f, "\"{}\"", s),
            Argument::Blob(b) => write!(f, "<Blob length {}>", b.len()),
            Argument::Long(v) => write!(f, "{}", v),
            Argument::Double(v) => write!(f, "{}", v),
            Argument::TimeTag(t) => write!(f, "<TimeTag {}.{}>", t.seconds(), t.fraction()),
            Argument::Char(c) => write!(f, "'{}'", c),
            Argument::Color(c) => write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                c.red, c.green, c.blue, c.alpha
            ),
            Argument::Midi(m) => write!(
                f,
                "<Midi {} {:02x} {:02x} {:02x}>",
                m.port, m.status, m.data1, m.data2
            ),
            Argument::True => write!(f, "true"),
            Argument::False => write!(f, "false"),
            Argument::Nil => write!(f, "nil"),
            Argument::Impulse => write!(f, "impulse"),
        }
    }
}
