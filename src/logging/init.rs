use std::sync::Once;

/// ### English
/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. `"info"`,
/// `"headless_gl=debug"`). `None` falls back to `RUST_LOG`, then to `info`.
///
/// ### 中文
/// 日志配置。
///
/// `env_filter` 使用 `env_logger` 的过滤语法（例如 `"info"`、`"headless_gl=debug"`）。
/// 为 `None` 时回退到 `RUST_LOG`，再回退到 `info`。
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// ### English
/// Installs `env_logger` as the global logger once; later calls are ignored.
///
/// If the host already installed a logger, that logger is kept.
///
/// ### 中文
/// 只安装一次 `env_logger` 作为全局 logger；后续调用会被忽略。
///
/// 若宿主已安装 logger，则保留宿主的 logger。
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!(target: "headless_gl", "logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{LoggingConfig, init_logging};

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging(LoggingConfig {
            env_filter: Some("headless_gl=debug".into()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());
        log::info!(target: "headless_gl", "still logging");
    }
}
