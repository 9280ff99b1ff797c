//! User settings for the expense tracker
//!
//! Manages the storage format, logging levels, log rotation and display
//! preferences. Every field has a serde default so older or hand-edited
//! config files keep loading.

use std::fmt::Write as _;
use std::io::ErrorKind;

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::paths::ExpensePaths;
use crate::error::ExpenseError;
use crate::storage::StorageFormat;

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Format of the expense data file
    #[serde(default)]
    pub storage_format: StorageFormat,

    /// Level filter for console log output (overridden by `RUST_LOG`)
    #[serde(default = "default_console_log_level")]
    pub console_log_level: String,

    /// Level filter for the log file
    #[serde(default = "default_file_log_level")]
    pub file_log_level: String,

    /// Whether to write a log file at all
    #[serde(default = "default_true")]
    pub log_to_file: bool,

    /// Size at which the log file is rotated
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,

    /// Number of rotated log files to keep
    #[serde(default = "default_log_backup_count")]
    pub log_backup_count: u32,

    /// Date format used when printing expenses (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Newest settings schema this build understands
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_console_log_level() -> String {
    "warn".to_string()
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_max_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_log_backup_count() -> u32 {
    3
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            storage_format: StorageFormat::default(),
            console_log_level: default_console_log_level(),
            file_log_level: default_file_log_level(),
            log_to_file: default_true(),
            log_max_bytes: default_log_max_bytes(),
            log_backup_count: default_log_backup_count(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, writing the defaults on first run
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file can't be parsed, was written by a
    /// newer schema, or holds an unusable date format.
    pub fn load_or_create(paths: &ExpensePaths) -> Result<Self, ExpenseError> {
        let settings_path = paths.settings_file();

        let settings: Settings = match std::fs::read_to_string(&settings_path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ExpenseError::Config(format!("Failed to parse settings file: {}", e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let settings = Settings::default();
                settings.save(paths)?;
                settings
            }
            Err(e) => {
                return Err(ExpenseError::Io(format!(
                    "Failed to read settings file: {}",
                    e
                )))
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check values serde can't check on its own
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(ExpenseError::Config(format!(
                "Settings schema version {} is newer than supported version {}",
                self.schema_version, SCHEMA_VERSION
            )));
        }

        // chrono reports bad specifiers only when formatting
        let mut rendered = String::new();
        if write!(rendered, "{}", Local::now().naive_local().format(&self.date_format)).is_err() {
            return Err(ExpenseError::Config(format!(
                "Invalid date format '{}'",
                self.date_format
            )));
        }

        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExpensePaths) -> Result<(), ExpenseError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ExpenseError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ExpenseError::Io(format!("Failed to write settings file: {}", e)))
    }
}
