//! Logging setup
//!
//! Builds the tracing dispatcher used by the application: a console layer on
//! stderr plus an optional size-rotated log file. Nothing is installed
//! globally; the entry point owns the returned handle and decides where the
//! dispatcher is used.

use std::fmt as std_fmt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::Dispatch;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{ExpensePaths, Settings};
use crate::error::{ExpenseError, ExpenseResult};

/// Local wall-clock timestamps, `2025-01-31 18:04:05`
#[derive(Debug, Clone, Copy, Default)]
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std_fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// The constructed logging capability
pub struct LoggingHandle {
    dispatch: Dispatch,
    log_file: Option<PathBuf>,
}

impl LoggingHandle {
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Path of the log file, if file logging is enabled
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

fn parse_filter(directives: &str) -> ExpenseResult<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| ExpenseError::Config(format!("Invalid log level '{}': {}", directives, e)))
}

/// Build the console and file logging layers described by `settings`
pub fn init_logging(paths: &ExpensePaths, settings: &Settings) -> ExpenseResult<LoggingHandle> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&settings.console_log_level)?,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(LocalTime)
        .with_filter(console_filter);

    let (file_layer, log_file) = if settings.log_to_file {
        let path = paths.log_file();
        paths.ensure_directories()?;
        rotate_log(&path, settings.log_max_bytes, settings.log_backup_count)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ExpenseError::Io(format!("Failed to open log file: {}", e)))?;

        let layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_timer(LocalTime)
            .with_filter(parse_filter(&settings.file_log_level)?);

        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer);

    Ok(LoggingHandle {
        dispatch: Dispatch::new(subscriber),
        log_file,
    })
}

fn rotated_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}", index));
    path.with_file_name(name)
}

/// Rotate `path` if it has reached `max_bytes`
///
/// Shifts `log` to `log.1`, `log.1` to `log.2` and so on, dropping anything
/// beyond `backup_count`. With no backups the file is simply removed.
/// Returns whether a rotation happened.
pub fn rotate_log(path: &Path, max_bytes: u64, backup_count: u32) -> ExpenseResult<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ExpenseError::Io(format!("Failed to inspect log file: {}", e))),
    };

    if max_bytes == 0 || size < max_bytes {
        return Ok(false);
    }

    let io_err = |e: std::io::Error| ExpenseError::Io(format!("Failed to rotate log file: {}", e));

    if backup_count == 0 {
        fs::remove_file(path).map_err(io_err)?;
        return Ok(true);
    }

    let oldest = rotated_path(path, backup_count);
    if oldest.exists() {
        fs::remove_file(&oldest).map_err(io_err)?;
    }

    for index in (1..backup_count).rev() {
        let from = rotated_path(path, index);
        if from.exists() {
            fs::rename(&from, rotated_path(path, index + 1)).map_err(io_err)?;
        }
    }

    fs::rename(path, rotated_path(path, 1)).map_err(io_err)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotate_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        assert!(!rotate_log(&path, 10, 3).unwrap());
    }

    #[test]
    fn test_rotate_small_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "short").unwrap();

        assert!(!rotate_log(&path, 1024, 3).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_rotate_shifts_backups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "current").unwrap();
        fs::write(rotated_path(&path, 1), "one").unwrap();
        fs::write(rotated_path(&path, 2), "two").unwrap();

        assert!(rotate_log(&path, 4, 2).unwrap());

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(rotated_path(&path, 1)).unwrap(), "current");
        assert_eq!(fs::read_to_string(rotated_path(&path, 2)).unwrap(), "one");
        assert!(!rotated_path(&path, 3).exists());
    }

    #[test]
    fn test_rotate_without_backups_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "0123456789").unwrap();

        assert!(rotate_log(&path, 5, 0).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_logging() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();

        let handle = init_logging(&paths, &settings).unwrap();
        assert_eq!(handle.log_file(), Some(paths.log_file().as_path()));

        tracing::dispatcher::with_default(handle.dispatch(), || {
            tracing::debug!("Loaded expenses");
            tracing::info!("Expense added successfully (ID: 1)");
        });

        let log = fs::read_to_string(paths.log_file()).unwrap();
        assert!(log.contains("DEBUG"));
        assert!(log.contains("Expense added successfully (ID: 1)"));
    }

    #[test]
    fn test_file_logging_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            log_to_file: false,
            ..Settings::default()
        };

        let handle = init_logging(&paths, &settings).unwrap();
        assert!(handle.log_file().is_none());
        assert!(!paths.log_file().exists());
    }

    #[test]
    fn test_invalid_level_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            file_log_level: "expense_tracker=loud".to_string(),
            ..Settings::default()
        };

        assert!(matches!(
            init_logging(&paths, &settings),
            Err(ExpenseError::Config(_))
        ));
    }
}
