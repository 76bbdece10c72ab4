//! Logging infrastructure for campus.
//!
//! Structured logging on the `tracing` ecosystem. The form controller logs
//! every skipped feature at `debug` so a degraded page can be diagnosed
//! without ever surfacing an error to the user.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.campus/logs/campus.log`
//! - Console output with configurable verbosity (disabled while the TUI owns
//!   the terminal)
//!
//! ## Example
//!
//! ```no_run
//! use campus_core::logging::{self, LogOutput};
//!
//! let _guard = logging::init_logging(None, false, LogOutput::FileAndConsole)
//!     .expect("logging init");
//!
//! tracing::info!("campus started");
//! tracing::debug!(feature = "tables", "table enhancer unavailable");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{CampusError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// JSON file plus a compact stderr layer
    FileAndConsole,
    /// JSON file only (the terminal is drawn by the TUI)
    FileOnly,
}

/// Initialize the campus logging system.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.campus/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
/// * `output` - Whether stderr receives log lines as well as the file
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool, output: LogOutput) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| CampusError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "campus.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("campus={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = match output {
        LogOutput::FileAndConsole => Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(verbose)
                .with_line_number(verbose)
                .compact(),
        ),
        LogOutput::FileOnly => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, ?output, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path.
///
/// Returns `~/.campus/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| CampusError::Internal {
        message: "HOME environment variable not set".into(),
    })?;

    Ok(PathBuf::from(home).join(".campus").join("logs"))
}

/// Get the default campus log file path.
///
/// Returns `~/.campus/logs/campus.log`
pub fn default_log_file() -> Result<PathBuf> {
    Ok(default_log_dir()?.join("campus.log"))
}

/// Log that a page feature was skipped because a collaborator is absent.
///
/// # Example
///
/// ```ignore
/// log_feature_skipped!("tables", reason = "no table enhancer");
/// ```
#[macro_export]
macro_rules! log_feature_skipped {
    ($feature:expr) => {
        tracing::debug!(
            target: "campus::forms",
            feature = $feature,
            "feature skipped"
        )
    };
    ($feature:expr, $($field:tt)*) => {
        tracing::debug!(
            target: "campus::forms",
            feature = $feature,
            $($field)*,
            "feature skipped"
        )
    };
}
