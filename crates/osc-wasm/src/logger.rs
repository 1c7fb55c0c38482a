//! `log` のレコードを `console.*` に転送するロガー

use core::str::FromStr;

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// `init_logger` でレベルを省略した場合
pub const DEFAULT_LEVEL: &str = "warn";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record<'_>) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

/// ロガーを登録してレベルを設定する
///
/// 2 回目以降はレベルの変更だけ行う。
pub fn init(level: &str) -> Result<(), log::ParseLevelError> {
    let filter = LevelFilter::from_str(level)?;
    // 既に登録済みなら Err が返るが、レベルは下で更新される
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(
                &Record::builder()
                    .level(Level::Warn)
                    .target("osc_transport::assembler")
                    .args(format_args!("discarding {} bytes", 8))
                    .build()
            ),
            "[WARN] osc_transport::assembler: discarding 8 bytes"
        );
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(init("loud").is_err());
    }

    #[test]
    fn test_default_level_parses() {
        assert_eq!(LevelFilter::from_str(DEFAULT_LEVEL).unwrap(), LevelFilter::Warn);
    }
}
