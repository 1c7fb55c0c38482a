//! TypeTagCodec: 引数 1 個と型タグ文字の相互変換
//!
//! OSC は型タグ文字列（全引数分まとめて）の後にペイロードを並べるため、
//! エンコードは「型タグ文字列」と「ペイロードバッファ」の 2 つに同時に追記する。
//!
//! ## 数値・文字列の表現
//! ```text
//! int32 / float32 : 4 bytes big-endian
//! int64 / double / timetag : 8 bytes big-endian
//! string / symbol : バイト列 + NUL + ゼロパディング（4 バイト境界）
//! blob            : [len: i32 BE][bytes][ゼロパディング（4 バイト境界）]
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::argument::{Argument, MidiMessage, Rgba};
use crate::error::{ArgumentError, OscError};
use crate::pad4;
use crate::reader::Reader;
use crate::timetag::TimeTag;

/// 引数をエンコードする
///
/// # 引数
/// - `arg`: エンコードする引数
/// - `tags`: 型タグ文字列（`,` で始まる）。型タグ文字を 1 つ追記する
/// - `payload`: ペイロードバッファ。4 バイト境界に揃えたペイロードを追記する
///
/// # エラー
/// - `OscError::MalformedArgument`: NUL を含む文字列、i32 に収まらない Blob。
///   このとき `tags` / `payload` は変更しない
pub fn encode(arg: &Argument, tags: &mut String, payload: &mut Vec<u8>) -> Result<(), OscError> {
    encode_payload(arg, payload)?;
    tags.push(arg.tag());
    Ok(())
}

/// 引数のペイロードのみを追記する
///
/// # エラー
/// - `OscError::MalformedArgument`: `encode` と同じ。失敗時は `out` を変更しない
pub fn encode_payload(arg: &Argument, out: &mut Vec<u8>) -> Result<(), OscError> {
    validate(arg).map_err(OscError::MalformedArgument)?;
    match arg {
        Argument::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Argument::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Argument::String(s) | Argument::Symbol(s) => write_padded_str(out, s.as_bytes()),
        Argument::Blob(b) => write_blob(out, b),
        Argument::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Argument::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Argument::TimeTag(t) => out.extend_from_slice(&t.raw().to_be_bytes()),
        Argument::Char(c) => out.extend_from_slice(&(*c as u32).to_be_bytes()),
        Argument::Color(c) => out.extend_from_slice(&[c.red, c.green, c.blue, c.alpha]),
        Argument::Midi(m) => out.extend_from_slice(&[m.port, m.status, m.data1, m.data2]),
        Argument::True | Argument::False | Argument::Nil | Argument::Impulse => {}
    }
    Ok(())
}

/// 引数がワイヤ上で表現できるか検証する
///
/// 文字列は NUL 終端なので NUL を含められない。Blob の長さは i32 に収まる必要がある。
pub fn validate(arg: &Argument) -> Result<(), ArgumentError> {
    match arg {
        Argument::String(s) | Argument::Symbol(s) if s.as_bytes().contains(&0) => {
            Err(ArgumentError::ContainsNul)
        }
        Argument::Blob(b) if b.len() > i32::MAX as usize => {
            Err(ArgumentError::BlobTooLarge(b.len()))
        }
        _ => Ok(()),
    }
}

/// 型タグ文字に従って引数を 1 個デコードする
///
/// 型タグが示すバイト数だけ `reader` を進める。
///
/// # エラー
/// - `OscError::MalformedArgument`: 未対応の型タグ、ペイロード不足、
///   NUL 終端のない文字列、負の Blob 長
pub fn decode(tag: char, reader: &mut Reader<'_>) -> Result<Argument, OscError> {
    decode_raw(tag, reader).map_err(OscError::MalformedArgument)
}

/// `decode` の詳細エラー版（メッセージのデコードから使う）
pub(crate) fn decode_raw(tag: char, reader: &mut Reader<'_>) -> Result<Argument, ArgumentError> {
    let arg = match tag {
        'i' => Argument::Int(i32::from_be_bytes(fixed::<4>(tag, reader)?)),
        'f' => Argument::Float(f32::from_be_bytes(fixed::<4>(tag, reader)?)),
        's' => Argument::String(read_string(reader)?),
        'S' => Argument::Symbol(read_string(reader)?),
        'b' => Argument::Blob(read_blob(reader)?),
        'h' => Argument::Long(i64::from_be_bytes(fixed::<8>(tag, reader)?)),
        'd' => Argument::Double(f64::from_be_bytes(fixed::<8>(tag, reader)?)),
        't' => Argument::TimeTag(TimeTag(u64::from_be_bytes(fixed::<8>(tag, reader)?))),
        'c' => {
            let raw = u32::from_be_bytes(fixed::<4>(tag, reader)?);
            Argument::Char(char::from_u32(raw).ok_or(ArgumentError::InvalidChar(raw))?)
        }
        'r' => {
            let [red, green, blue, alpha] = fixed::<4>(tag, reader)?;
            Argument::Color(Rgba { red, green, blue, alpha })
        }
        'm' => {
            let [port, status, data1, data2] = fixed::<4>(tag, reader)?;
            Argument::Midi(MidiMessage { port, status, data1, data2 })
        }
        'T' => Argument::True,
        'F' => Argument::False,
        'N' => Argument::Nil,
        'I' => Argument::Impulse,
        other => return Err(ArgumentError::UnknownTag(other)),
    };
    Ok(arg)
}

/// 固定長ペイロードを読む
fn fixed<const N: usize>(tag: char, reader: &mut Reader<'_>) -> Result<[u8; N], ArgumentError> {
    let available = reader.remaining();
    reader.take_array::<N>().ok_or(ArgumentError::Truncated {
        tag,
        needed: N,
        available,
    })
}

fn read_string(reader: &mut Reader<'_>) -> Result<String, ArgumentError> {
    let bytes = reader.read_padded_str().ok_or(ArgumentError::Unterminated)?;
    core::str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| ArgumentError::InvalidUtf8)
}

fn read_blob(reader: &mut Reader<'_>) -> Result<Vec<u8>, ArgumentError> {
    let available = reader.remaining();
    let len = reader.read_i32().ok_or(ArgumentError::Truncated {
        tag: 'b',
        needed: 4,
        available,
    })?;
    if len < 0 {
        return Err(ArgumentError::NegativeLength(len));
    }
    let padded = pad4(len as usize);
    let available = reader.remaining();
    let data = reader.take(padded).ok_or(ArgumentError::Truncated {
        tag: 'b',
        needed: padded,
        available,
    })?;
    Ok(data[..len as usize].to_vec())
}

/// NUL 終端 + 4 バイト境界パディング付きで文字列を書き出す
pub(crate) fn write_padded_str(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let pad = pad4(bytes.len() + 1) - bytes.len();
    out.resize(out.len() + pad, 0);
}

/// 長さは `validate` で i32 に収まることを確認済みであること
fn write_blob(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
    out.extend_from_slice(bytes);
    let pad = pad4(bytes.len()) - bytes.len();
    out.resize(out.len() + pad, 0);
}
