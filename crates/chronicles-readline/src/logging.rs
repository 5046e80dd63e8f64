//! Tracing setup for the REPL.
//!
//! Logs go to a daily-rolling file so they never interleave with the prompt.

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "chronicles.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered lines are lost.
///
/// An explicit `--log-level` wins over `RUST_LOG`, which wins over the
/// configured level.
pub fn init(log_dir: &Path, explicit: Option<&str>, configured: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let filter = match explicit {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured))?,
    };

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(guard)
}
