//! Logging setup for tabloid.
//!
//! Console output always goes to stderr so that command output on stdout
//! stays machine-readable. When a log directory is configured, a second
//! layer writes to daily-rotated files there.
//!
//! ```no_run
//! use tabloid::logging;
//!
//! logging::init("info", None).expect("Failed to initialize logging");
//! tracing::info!("Batch started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Rotated log files kept on disk.
const MAX_LOG_FILES: usize = 10;

/// Builds the filter: `RUST_LOG` when set, otherwise `default_level`.
///
/// # Errors
///
/// Returns error if `default_level` is not a valid filter directive.
pub fn env_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("Invalid log level '{default_level}'"))
}

/// Initializes the global subscriber.
///
/// # Errors
///
/// Returns error if the filter is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init(default_level: &str, log_dir: Option<&Path>) -> Result<()> {
    let filter = env_filter(default_level)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_FILES)
                .filename_prefix("tabloid")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create file appender")?;
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(?log_dir, "Logging initialized");
    Ok(())
}

/// Path of today's log file inside `log_dir`.
pub fn current_log_path(log_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    log_dir.join(format!("tabloid.{today}.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_levels() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("tabloid=trace,warn").is_ok());
    }

    #[test]
    fn test_current_log_path_is_dated() {
        let path = current_log_path(Path::new("/var/log/tabloid"));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("tabloid.") && name.ends_with(".log"));
    }
}
