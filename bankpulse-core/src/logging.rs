//! Logging for bankpulse.
//!
//! Runs on `tracing` with a daily-rotated file in the XDG state
//! directory. Rotation depth comes from [`LoggingConfig::max_files`];
//! older files are pruned by the appender. Console output belongs to
//! the CLI surface, not this layer, so stdout stays clean for
//! `--format json` consumers.

use crate::config::{Config, LoggingConfig};
use crate::error::Error;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Daily-rotated appender writing `bankpulse.log.<date>` files under
/// `log_dir`, keeping at most `max_files` of them.
fn file_appender(log_dir: &Path, max_files: usize) -> crate::error::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("bankpulse.log")
        .max_log_files(max_files.max(1))
        .build(log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))
}

/// Initialize the logging system.
///
/// Level comes from `RUST_LOG` when set, otherwise from the config.
/// Returns a guard that must outlive the process body; dropping it
/// flushes pending writes.
pub fn init(config: &LoggingConfig) -> crate::error::Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let appender = file_appender(&log_dir, config.max_files)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        max_files = config.max_files,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Initialize logging for tests (writes to the test capture buffer).
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps the non-blocking log worker alive; flushes on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Returns the log file path
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_path() {
        let path = log_file_path();
        assert!(path.ends_with("bankpulse.log"));
    }

    #[test]
    fn test_file_appender_honors_config() {
        let dir = TempDir::new().unwrap();

        let mut appender = file_appender(dir.path(), 3).expect("appender builds");
        writeln!(appender, "rotation smoke line").unwrap();
        drop(appender);

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("bankpulse.log"));

        // A zero depth from a hand-edited config is clamped, not an error
        assert!(file_appender(dir.path(), 0).is_ok());
    }
}
