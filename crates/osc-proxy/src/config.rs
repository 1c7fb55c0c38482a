//! ProxyClient の設定

use osc_transport::{AssemblerConfig, FramingMode};

/// ProxyClient の設定
///
/// JSON から読む場合は省略したフィールドにデフォルト値が入る:
///
/// ```json
/// { "mode": "length_prefixed_stream", "max_depth": 8 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProxyConfig {
    /// 受信側の再組み立て設定（`mode` は送信側のフレーミングにも使う）
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub assembler: AssemblerConfig,
}

impl ProxyConfig {
    pub fn new(mode: FramingMode) -> Self {
        ProxyConfig {
            assembler: AssemblerConfig::new(mode),
        }
    }

    pub fn mode(&self) -> FramingMode {
        self.assembler.mode
    }
}

impl From<AssemblerConfig> for ProxyConfig {
    fn from(assembler: AssemblerConfig) -> Self {
        ProxyConfig { assembler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osc_transport::DEFAULT_MAX_FRAME_LEN;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.mode(), FramingMode::FramedTransport);
        assert_eq!(config.assembler.max_frame_len, DEFAULT_MAX_FRAME_LEN);
        assert_eq!(config.assembler.max_depth, osc_codec::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_new_keeps_limits() {
        let config = ProxyConfig::new(FramingMode::LengthPrefixedStream);
        assert_eq!(config.mode(), FramingMode::LengthPrefixedStream);
        assert_eq!(config.assembler.max_frame_len, DEFAULT_MAX_FRAME_LEN);
    }
}
