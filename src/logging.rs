//! Logging for batch runs
//!
//! Events go to stderr and to daily-rotated files in the platform data
//! directory. Warnings and errors are also copied to a separate `error` log,
//! which is where stage failures and empty-aggregation warnings end up.
//!
//! ## Usage
//!
//! ```no_run
//! use marquee::logging;
//!
//! logging::init().expect("Failed to initialize logging");
//! tracing::info!("Pipeline started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const LOG_PREFIX: &str = "marquee";
const ERROR_LOG_PREFIX: &str = "error";
const RETAINED_FILES: usize = 10;

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/marquee/logs`
/// - macOS: `~/Library/Application Support/marquee/logs`
/// - Linux: `~/.local/share/marquee/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join(LOG_PREFIX).join("logs");
    ensure_dir(&log_dir)?;
    Ok(log_dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Initializes logging into the platform log directory
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a file appender fails
pub fn init() -> Result<()> {
    init_in(&get_log_dir()?)
}

/// Initializes logging with file output under `log_dir`
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_in(log_dir: &Path) -> Result<()> {
    ensure_dir(log_dir)?;

    let all_logs_appender = appender(log_dir, LOG_PREFIX)?;
    let error_logs_appender = appender(log_dir, ERROR_LOG_PREFIX)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    // stdout carries command output, so console logs use stderr
    let console_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Logging was already initialized")?;

    tracing::debug!(
        "Logging initialized, writing to {}",
        current_log_path(log_dir).display()
    );
    Ok(())
}

fn appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(RETAINED_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Today's file of the main log under `log_dir`
fn current_log_path(log_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    log_dir.join(format!("{LOG_PREFIX}.{today}.log"))
}
