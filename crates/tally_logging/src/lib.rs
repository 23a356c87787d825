//! Tracing setup for Tally binaries.
//!
//! Two layers: a daily-rotated file under `~/.tally/logs/` written through a
//! non-blocking worker, and stderr. `RUST_LOG` overrides the default filter
//! for both.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tally=info,tally_db=info,tally_extract=info,tally_sheets=info";
/// Daily files kept before the oldest is deleted.
const MAX_LOG_FILES: usize = 7;

pub struct LogConfig<'a> {
    /// File name prefix; sanitized.
    pub app_name: &'a str,
    /// Mirror the file filter on stderr.
    pub verbose: bool,
    /// Only warnings and errors on stderr (used when stdout is a data channel).
    pub quiet_console: bool,
    /// Defaults to `~/.tally/logs`.
    pub log_dir: Option<PathBuf>,
}

/// Flushes buffered file output when dropped. Hold it for the life of `main`.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: WorkerGuard,
    pub log_dir: PathBuf,
}

pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let log_dir = config
        .log_dir
        .unwrap_or_else(tally_protocol::paths::default_logs_dir);
    let appender = file_appender(&log_dir, config.app_name)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter = env_filter();
    let console_filter = if config.quiet_console && !config.verbose {
        EnvFilter::new("warn")
    } else {
        env_filter()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Global tracing subscriber already installed")?;

    Ok(LogGuard {
        _file: guard,
        log_dir,
    })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// `<dir>/<app>.<date>.log`, rotated daily.
fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(sanitize_name(app_name))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();
    if cleaned.is_empty() {
        "tally".to_string()
    } else {
        cleaned
    }
}
