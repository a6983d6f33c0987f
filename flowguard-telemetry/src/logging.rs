//! ## flowguard-telemetry::logging
//! **Local log output for the agent**
//!
//! Human-readable `tracing` output on stdout, optionally teed into an
//! append-only log file. Operational [`LogEvent`]s are recorded through the
//! same subscriber under the `flowguard::event` target.

use std::fs::{create_dir_all, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flowguard_core::{LogEvent, Severity};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid log level '{level}': {reason}")]
    Level { level: String, reason: String },

    #[error("a global subscriber is already installed: {0}")]
    Install(String),
}

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over `level` when set.
    pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(level).map_err(|e| LoggingError::Level {
                level: level.to_string(),
                reason: e.to_string(),
            })?,
        };

        let (writer, ansi) = match file {
            Some(path) => {
                let file = open_log_file(path)?;
                (BoxMakeWriter::new(io::stdout.and(Mutex::new(file))), false)
            }
            None => (BoxMakeWriter::new(io::stdout), true),
        };

        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_thread_names(true)
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| LoggingError::Install(e.to_string()))?;

        if let Some(path) = file {
            info!(file = %path.display(), "logging to file");
        }
        Ok(())
    }

    /// Records an operational event locally at its severity.
    pub fn record(event: &LogEvent) {
        match event.severity {
            Severity::Info => info!(target: "flowguard::event", "{}", event.message),
            Severity::Warn => warn!(target: "flowguard::event", "{}", event.message),
            Severity::Error => error!(target: "flowguard::event", "{}", event.message),
        }
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LoggingError> {
    let file_error = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(file_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(file_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn records_events_at_their_severity() {
        EventLogger::record(&LogEvent::warn("10.0.0.7 - No features extracted."));
        EventLogger::record(&LogEvent::error("10.0.0.7 - capture failed"));

        assert!(logs_contain("WARN"));
        assert!(logs_contain("No features extracted."));
        assert!(logs_contain("ERROR"));
        assert!(logs_contain("capture failed"));
    }

    #[test]
    fn log_file_is_created_with_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agent.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn bad_level_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let result = EventLogger::init("info,flowguard=notalevel", None);
        assert!(matches!(result, Err(LoggingError::Level { .. })));
    }
}
