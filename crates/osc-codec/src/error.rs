//! osc-codec エラー型

/// OSC パケットの構築・デコードのエラー
///
/// デコード時のエラーはその解析に対して終端的（部分的な結果は返さない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscError {
    /// 引数のペイロードが不正（TypeTagCodec レベル）
    ///
    /// エンコード時にも返る（NUL を含む文字列、i32 に収まらない Blob）。
    MalformedArgument(ArgumentError),
    /// アドレスパターンが不正（構築時）
    InvalidAddress(AddressError),
    /// メッセージの構造が不正
    MalformedMessage(MessageError),
    /// `#bundle\0` マーカーで始まっていない
    NotABundle,
    /// バンドルの構造が不正（長さ超過・入れ子が深すぎる等）
    MalformedBundle(BundleError),
    /// 先頭バイトが `/` でも `#` でもない（`None` は空のバイト列）
    UnknownPacketType(Option<u8>),
}

/// 引数 1 個分のエンコード/デコードエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// サポートしていない型タグ
    UnknownTag(char),
    /// ペイロードがバッファ末尾を超える
    Truncated {
        /// 型タグ
        tag: char,
        /// 必要なバイト数
        needed: usize,
        /// 残りのバイト数
        available: usize,
    },
    /// 文字列に NUL 終端がない
    Unterminated,
    /// 文字列が UTF-8 として不正
    InvalidUtf8,
    /// Blob の長さプレフィックスが負
    NegativeLength(i32),
    /// `c` 型の値が Unicode スカラー値ではない
    InvalidChar(u32),
    /// 文字列引数が NUL を含む（NUL 終端と区別できない）
    ContainsNul,
    /// Blob の長さが i32 の長さプレフィックスに収まらない
    BlobTooLarge(usize),
}

/// アドレスパターンの検証エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// 空文字列
    Empty,
    /// 先頭が `/` ではない
    MissingLeadingSlash,
    /// NUL 文字を含む
    ContainsNul,
}

/// メッセージ構造のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// アドレス文字列が NUL 終端・パディングされていない
    UnterminatedAddress,
    /// アドレスが UTF-8 として不正
    AddressNotUtf8,
    /// デコードしたアドレスが不正
    InvalidAddress(AddressError),
    /// 型タグ文字列が `,` で始まっていない
    MissingTypeTags,
    /// 型タグ文字列が NUL 終端・パディングされていない
    UnterminatedTypeTags,
    /// 引数ペイロードが不正（途中で切れている等）
    Argument(ArgumentError),
    /// 最後の引数の後に余分なバイトがある
    TrailingBytes(usize),
}

/// バンドル構造のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// マーカー + タイムタグ（16 バイト）に満たない
    TooShort,
    /// 要素の長さプレフィックスが途中で切れている
    TruncatedLength,
    /// 要素の長さが残りのバッファを超える
    LengthExceedsRemaining {
        /// 長さプレフィックスの値
        declared: usize,
        /// 残りのバイト数
        remaining: usize,
    },
    /// 入れ子の深さが上限を超えた
    DepthExceeded {
        /// 上限値
        max_depth: usize,
    },
    /// 要素の先頭が `/` でもバンドルマーカーでもない（`None` は長さ 0 の要素）
    UnknownElement(Option<u8>),
}

impl From<AddressError> for OscError {
    fn from(e: AddressError) -> Self {
        OscError::InvalidAddress(e)
    }
}

impl core::fmt::Display for OscError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OscError::MalformedArgument(e) => write!(f, "Malformed argument: {}", e),
            OscError::InvalidAddress(e) => write!(f, "Invalid address: {}", e),
            OscError::MalformedMessage(e) => write!(f, "Malformed message: {}", e),
            OscError::NotABundle => write!(f, "Not a bundle (missing #bundle marker)"),
            OscError::MalformedBundle(e) => write!(f, "Malformed bundle: {}", e),
            OscError::UnknownPacketType(Some(b)) => {
                write!(f, "Unknown packet type (first byte 0x{:02x})", b)
            }
            OscError::UnknownPacketType(None) => write!(f, "Unknown packet type (empty packet)"),
        }
    }
}

impl core::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ArgumentError::UnknownTag(c) => write!(f, "unsupported type tag '{}'", c.escape_default()),
            ArgumentError::Truncated { tag, needed, available } => write!(
                f,
                "'{}' payload truncated (needs {} bytes, {} available)",
                tag, needed, available
            ),
            ArgumentError::Unterminated => write!(f, "string is not NUL-terminated"),
            ArgumentError::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            ArgumentError::NegativeLength(len) => write!(f, "negative blob length {}", len),
            ArgumentError::InvalidChar(v) => write!(f, "invalid char value 0x{:08x}", v),
            ArgumentError::ContainsNul => write!(f, "string contains a NUL byte"),
            ArgumentError::BlobTooLarge(len) => {
                write!(f, "blob of {} bytes exceeds the i32 length prefix", len)
            }
        }
    }
}

impl core::fmt::Display for AddressError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AddressError::Empty => write!(f, "address is empty"),
            AddressError::MissingLeadingSlash => write!(f, "address must start with '/'"),
            AddressError::ContainsNul => write!(f, "address contains a NUL byte"),
        }
    }
}

impl core::fmt::Display for MessageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MessageError::UnterminatedAddress => write!(f, "address is not terminated"),
            MessageError::AddressNotUtf8 => write!(f, "address is not valid UTF-8"),
            MessageError::InvalidAddress(e) => write!(f, "{}", e),
            MessageError::MissingTypeTags => write!(f, "type tag string must start with ','"),
            MessageError::UnterminatedTypeTags => write!(f, "type tag string is not terminated"),
            MessageError::Argument(e) => write!(f, "{}", e),
            MessageError::TrailingBytes(n) => write!(f, "{} trailing bytes after arguments", n),
        }
    }
}

impl core::fmt::Display for BundleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BundleError::TooShort => write!(f, "bundle header too short"),
            BundleError::TruncatedLength => write!(f, "element length prefix truncated"),
            BundleError::LengthExceedsRemaining { declared, remaining } => write!(
                f,
                "element length {} exceeds remaining {} bytes",
                declared, remaining
            ),
            BundleError::DepthExceeded { max_depth } => {
                write!(f, "bundle nesting exceeds max depth {}", max_depth)
            }
            BundleError::UnknownElement(Some(b)) => {
                write!(f, "unknown element type (first byte 0x{:02x})", b)
            }
            BundleError::UnknownElement(None) => write!(f, "empty element"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OscError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_encode_errors() {
        assert_eq!(
            OscError::MalformedArgument(ArgumentError::ContainsNul).to_string(),
            "Malformed argument: string contains a NUL byte"
        );
        assert_eq!(
            ArgumentError::BlobTooLarge(1 << 31).to_string(),
            "blob of 2147483648 bytes exceeds the i32 length prefix"
        );
    }

    #[test]
    fn test_display_nested_detail() {
        let err = OscError::MalformedMessage(MessageError::Argument(ArgumentError::Unterminated));
        assert_eq!(err.to_string(), "Malformed message: string is not NUL-terminated");
    }

    #[test]
    fn test_display_unknown_packet_type() {
        assert_eq!(
            OscError::UnknownPacketType(Some(b'x')).to_string(),
            "Unknown packet type (first byte 0x78)"
        );
        assert_eq!(
            OscError::UnknownPacketType(None).to_string(),
            "Unknown packet type (empty packet)"
        );
    }
}
