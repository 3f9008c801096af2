//! Tracing subscriber setup for the binary

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "RELEASE_PROGRESS_LOG";

/// Logging options collected from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Also write logs to stderr
    pub stderr: bool,
    /// Write the log file as JSON lines
    pub json: bool,
}

/// Initializes the tracing subscriber to write logs to `log_path`.
///
/// The returned guard flushes the non-blocking writer when dropped and must be
/// kept alive for the lifetime of the program.
pub fn init(log_path: &Path, options: LogOptions) -> Result<WorkerGuard> {
    let log_dir = log_path
        .parent()
        .context("Log path has no parent directory")?;
    let file_name = log_path
        .file_name()
        .context("Log path has no file name")?;
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Couldn't create the log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .with_env_var(LOG_ENV)
        .from_env()
        .context("Couldn't parse the log filter")?;

    let file_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_ansi(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_target(false)
            .with_ansi(false)
            .boxed()
    };

    let stderr_layer = options
        .stderr
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Couldn't install the tracing subscriber")?;

    Ok(guard)
}
