use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::config::LoggingConfig;
use crate::domain::DomainError;

const LOG_FILE: &str = "transcriptor.log";

/// Default filter directive: our crate at `level`, dependencies at warn.
fn default_directive(level: &str) -> String {
    format!("transcriptor={},warn", level)
}

/// Initialize console logging and, when enabled, daily-rotated JSON file logs.
///
/// Returns a guard that must be kept alive for the duration of the application;
/// dropping it flushes the file writer. Safe to call more than once.
pub fn init_logging(
    logs_dir: &Path,
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, DomainError> {
    let level = config.level.as_str();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(env_filter);

    if !config.file_logging {
        let _ = tracing_subscriber::registry().with(console_layer).try_init();
        tracing::info!(level = level, "Logging initialized (console only)");
        return Ok(None);
    }

    fs::create_dir_all(logs_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(EnvFilter::new(format!("transcriptor={}", level)));

    if tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(logs_dir = ?logs_dir, level = level, "Logging initialized with file output");
    }

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("debug"), "transcriptor=debug,warn");
    }

    #[test]
    fn test_console_only_returns_no_guard() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file_logging: false,
        };
        let logs_dir = env::temp_dir().join("transcriptor_log_console");

        let guard = init_logging(&logs_dir, &config).unwrap();
        assert!(guard.is_none());
        // Second initialization must not panic.
        assert!(init_logging(&logs_dir, &config).unwrap().is_none());
    }
}
