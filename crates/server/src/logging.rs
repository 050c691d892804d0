//! Logging setup: stderr plus daily-rolling backend and frontend log files.
//!
//! Events with the [`FRONTEND_TARGET`] target are client-reported errors and
//! go to their own file; everything else lands in the backend file.

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::{Targets, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

pub const FRONTEND_TARGET: &str = "frontend";

/// Rotated files kept per log.
const RETAINED_FILES: usize = 7;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory: {0}")]
    Io(#[from] io::Error),

    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("global subscriber already set: {0}")]
    Init(#[from] TryInitError),
}

/// Flush guards for the non-blocking writers. Keep alive for the process lifetime.
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards {
    _backend: WorkerGuard,
    _frontend: WorkerGuard,
}

/// Installs the global subscriber writing under `log_dir`.
pub fn setup_logging(log_dir: &Path) -> Result<LogGuards, LoggingError> {
    let (subscriber, guards) = subscriber(log_dir)?;
    subscriber.try_init()?;

    tracing::info!(log_dir = %log_dir.display(), "Logging initialized");
    Ok(guards)
}

/// Builds the subscriber without installing it.
pub fn subscriber(
    log_dir: &Path,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogGuards), LoggingError> {
    std::fs::create_dir_all(log_dir)?;

    let (backend_writer, backend_guard) =
        tracing_appender::non_blocking(rolling_file(log_dir, "backend")?);
    let (frontend_writer, frontend_guard) =
        tracing_appender::non_blocking(rolling_file(log_dir, "frontend")?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    let backend_layer = tracing_subscriber::fmt::layer()
        .with_writer(backend_writer)
        .with_ansi(false)
        .with_filter(filter_fn(|meta| meta.target() != FRONTEND_TARGET));

    let frontend_layer = tracing_subscriber::fmt::layer()
        .with_writer(frontend_writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(FRONTEND_TARGET, tracing::Level::ERROR));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(backend_layer)
        .with(frontend_layer);

    Ok((
        subscriber,
        LogGuards {
            _backend: backend_guard,
            _frontend: frontend_guard,
        },
    ))
}

fn rolling_file(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(RETAINED_FILES)
        .build(log_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_log(dir: &Path, prefix: &str) -> String {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| fs::read_to_string(entry.path()).unwrap())
            .collect()
    }

    #[test]
    fn frontend_events_are_split_from_backend_events() {
        let dir = tempfile::tempdir().unwrap();
        let (subscriber, guards) = subscriber(dir.path()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("server started");
            tracing::error!(target: FRONTEND_TARGET, "client crashed");
            tracing::warn!(target: FRONTEND_TARGET, "client warning");
        });
        drop(guards);

        let backend = read_log(dir.path(), "backend");
        let frontend = read_log(dir.path(), "frontend");

        assert!(backend.contains("server started"));
        assert!(!backend.contains("client crashed"));
        assert!(frontend.contains("client crashed"));
        assert!(!frontend.contains("client warning"));
        assert!(!frontend.contains("server started"));
    }
}
