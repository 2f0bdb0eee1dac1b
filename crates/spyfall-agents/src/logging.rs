//! Tracing setup: console output plus `game_execution.log` in the log directory.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

pub const EXECUTION_LOG_FILE: &str = "game_execution.log";

/// Open `{dir}/game_execution.log` for appending, creating `dir` if needed.
pub fn open_execution_log(dir: &Path) -> Result<File> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(EXECUTION_LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Plain-text layer writing to the execution log, filtered by `directive`.
pub fn execution_log_layer<S>(dir: &Path, directive: &str) -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = open_execution_log(dir)?;
    Ok(fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_filter(EnvFilter::new(directive)))
}

/// Install the global subscriber.
///
/// The console honors `RUST_LOG` and falls back to `console_directive`; the
/// file always uses the configured `log_level`.
pub fn init(console_directive: &str, logging: &LoggingConfig) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive));
    let file_layer = execution_log_layer(&logging.output_dir, logging.tracing_directive())?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")
}
