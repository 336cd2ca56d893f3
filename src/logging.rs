//! File-based logging.
//!
//! The terminal belongs to the calendar while the app runs, so log records
//! go to a rotating file instead of stderr.  Nothing is logged unless a log
//! directory is configured.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "calvas";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable consulted for the log level when none is given on
/// the command line
pub(crate) const LOG_LEVEL_ENV: &str = "CALVAS_LOG";

pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Picks the level spec from the command line, else from `$CALVAS_LOG`, else
/// the default
pub(crate) fn choose_level(explicit: Option<String>, from_env: Option<String>) -> String {
    explicit
        .or(from_env)
        .unwrap_or_else(|| String::from(DEFAULT_LOG_LEVEL))
}

/// Starts logging to `log_dir`.  Logging stops (after a final flush) when the
/// returned handle is dropped.
pub(crate) fn init_logging(log_dir: &Path, level: &str) -> Result<LoggerHandle, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;
    let handle = Logger::try_with_str(level)
        .map_err(|source| LoggingError::Level {
            level: level.to_owned(),
            source,
        })?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Start)?;
    info!(
        "event=logging_start level={level} log_dir={} version={}",
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

#[derive(Debug, Error)]
pub(crate) enum LoggingError {
    #[error("failed to create log directory {}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("invalid log level {level:?}")]
    Level {
        level: String,
        source: FlexiLoggerError,
    },
    #[error("failed to start logger")]
    Start(#[source] FlexiLoggerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only failures that happen before the global logger is installed are
    // exercised here; a successful start can happen once per process.

    #[test]
    fn test_choose_level() {
        assert_eq!(
            choose_level(Some(String::from("debug")), Some(String::from("warn"))),
            "debug"
        );
        assert_eq!(choose_level(None, Some(String::from("warn"))), "warn");
        assert_eq!(choose_level(None, None), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_invalid_level() {
        let tmpdir = tempfile::tempdir().unwrap();
        let err = init_logging(tmpdir.path(), "calvas=loud").err().expect("init_logging should fail");
        assert!(matches!(err, LoggingError::Level { .. }), "{err:?}");
        assert_eq!(err.to_string(), r#"invalid log level "calvas=loud""#);
    }

    #[test]
    fn test_log_dir_under_a_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let blocker = tmpdir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = init_logging(&blocker.join("logs"), DEFAULT_LOG_LEVEL).err().expect("init_logging should fail");
        assert!(matches!(err, LoggingError::CreateDir { .. }), "{err:?}");
    }
}
