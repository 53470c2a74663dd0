//! Tracing setup: console output plus a rotating log file.
//!
//! The file lives in the app-state directory next to the watermark, rotates
//! daily, and keeps at most `logging.max_files` archives.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogConfig;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "fmtv=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Console-only logging, used by the one-shot CLI commands.
pub fn init_console() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter())
        .init();
}

/// Console + rotating file logging for the poller.
///
/// The returned guard flushes the background writer on drop; keep it alive
/// for the lifetime of the process. Falls back to console-only logging if the
/// log directory cannot be prepared.
pub fn init_with_file(dir: &Path, config: &LogConfig) -> Option<WorkerGuard> {
    let appender = std::fs::create_dir_all(dir)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(config.file_name.as_str())
                .max_log_files(config.max_files.max(1))
                .build(dir)
                .map_err(|e| e.to_string())
        });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true))
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(env_filter())
                .init();
            Some(guard)
        }
        Err(e) => {
            init_console();
            tracing::warn!("Log file disabled, could not open {:?}: {}", dir, e);
            None
        }
    }
}
