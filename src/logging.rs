//! Logging setup for applications embedding tabclean.
//!
//! The library itself only emits `tracing` events: fail-soft loads and
//! rejected operator calls are `warn!`, row counts are `debug!`/`info!`.
//! Nothing is printed unless the host installs a subscriber, either its own
//! or one of the helpers here.
//!
//! ```no_run
//! use tabclean::logging;
//!
//! // Initialize once at startup
//! logging::init().expect("Failed to initialize logging");
//!
//! let table = tabclean::table::Table::load("missing.csv", None);
//! // -> WARN Error initializing table from delimited-text source: ...
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// File name prefix of the all-levels log.
pub const LOG_PREFIX: &str = "tabclean";

/// File name prefix of the warnings-and-errors log.
pub const ERROR_LOG_PREFIX: &str = "error";

fn env_filter() -> Result<EnvFilter> {
    // Default to INFO, allow override with RUST_LOG
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")
}

/// Install a console subscriber.
///
/// # Errors
///
/// Returns error if the filter cannot be built or a global subscriber is
/// already installed.
pub fn init() -> Result<()> {
    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Install a console subscriber plus daily-rotated log files in `log_dir`.
///
/// Creates two log files:
/// - `tabclean.<date>.log`: all enabled levels
/// - `error.<date>.log`: warnings and errors only
///
/// # Errors
///
/// Returns error if `log_dir` cannot be created or the appenders fail
pub fn init_with_log_dir(log_dir: impl AsRef<Path>) -> Result<()> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(ERROR_LOG_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create error-logs file appender")?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true);

    let all_logs_layer = fmt::layer()
        .with_target(true)
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
        .with(env_filter()?)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized, log directory: {}", log_dir.display());
    Ok(())
}

/// Path of today's all-levels log file in `log_dir`.
pub fn current_log_path(log_dir: impl AsRef<Path>) -> PathBuf {
    dated_log_path(log_dir.as_ref(), LOG_PREFIX)
}

/// Path of today's error log file in `log_dir`.
pub fn current_error_log_path(log_dir: impl AsRef<Path>) -> PathBuf {
    dated_log_path(log_dir.as_ref(), ERROR_LOG_PREFIX)
}

fn dated_log_path(log_dir: &Path, prefix: &str) -> PathBuf {
    // tracing-appender names daily files with the UTC date
    let today = chrono::Utc::now().format("%Y-%m-%d");
    log_dir.join(format!("{prefix}.{today}.log"))
}
