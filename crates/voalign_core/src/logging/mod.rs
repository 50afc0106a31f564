//! Logging infrastructure for VoiceOver Align.
//!
//! This module provides:
//! - Per-run loggers with file + callback dual output
//! - Compact mode with progress filtering
//! - Tail buffer dumped when a run fails
//! - Application-wide `tracing` setup with an optional daily file
//!
//! # Example
//!
//! ```no_run
//! use voalign_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("clip_fr", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Script extraction");
//! logger.progress(50);
//! logger.success("Narration written");
//! ```

mod run_logger;
mod types;

pub(crate) use run_logger::sanitize_filename;
pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the daily-rolling application log.
pub const APP_LOG_PREFIX: &str = "voalign.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
/// - Also writes a daily-rolling file in `log_dir`, when given
///
/// Should be called once at application startup. Keep the returned guard
/// alive for as long as file output is wanted.
pub fn init_tracing(default_level: LogLevel, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, APP_LOG_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
