//! Tracing subscriber setup for the gateway.

use crate::config::{Config, LogFormat};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "gemini-gateway.log";

/// Where and how log lines are written, taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Daily-rotated directory; `None` writes to stderr.
    pub file_dir: Option<String>,
}

impl LogSettings {
    pub fn from_config(config: &Config) -> Self {
        let file_dir = config
            .logging_to_file
            .then(|| config.log_dir.clone().unwrap_or_else(|| "./logs".to_string()));
        Self {
            format: config.log_format,
            file_dir,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// The returned guard must be held until exit so buffered file output is flushed.
pub fn init_logging(level: &str, settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match (&settings.file_dir, settings.format) {
        (Some(dir), format) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            match format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Text => builder.init(),
            }
            Some(guard)
        }
        (None, LogFormat::Json) => {
            builder.with_writer(std::io::stderr).json().init();
            None
        }
        (None, LogFormat::Text) => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        assert_eq!(
            LogSettings::default(),
            LogSettings {
                format: LogFormat::Text,
                file_dir: None,
            }
        );

        let config = Config {
            logging_to_file: true,
            log_format: LogFormat::Json,
            ..Config::default()
        };
        let settings = LogSettings::from_config(&config);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.file_dir.as_deref(), Some("./logs"));

        let config = Config {
            logging_to_file: true,
            log_dir: Some("/var/log/gateway".into()),
            ..Config::default()
        };
        assert_eq!(
            LogSettings::from_config(&config).file_dir.as_deref(),
            Some("/var/log/gateway")
        );

        // a log dir alone does not switch output to a file
        let config = Config {
            log_dir: Some("/tmp/x".into()),
            ..Config::default()
        };
        assert!(LogSettings::from_config(&config).file_dir.is_none());
    }
}
