//! Storage layer for the expense tracker
//!
//! Backends persist the whole expense collection as an ordered list of generic
//! key-value records. Typing happens one layer up, in the repository.

pub mod csv;
pub mod expenses;
pub mod file_io;
pub mod json;
pub mod memory;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ExpenseResult;

pub use self::csv::CsvFileStorage;
pub use expenses::{ExpenseRepository, ExpenseStore};
pub use file_io::{read_json, write_json_atomic};
pub use json::JsonFileStorage;
pub use memory::MemoryStorage;

/// One persisted expense before it is typed
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Whole-collection persistence
///
/// `write` replaces the entire stored collection; there are no partial
/// updates or appends.
pub trait StorageBackend {
    /// Read every stored record, in stored order
    fn read(&self) -> ExpenseResult<Vec<Record>>;

    /// Replace the stored collection with `records`
    fn write(&self, records: &[Record]) -> ExpenseResult<()>;

    /// Short human-readable description of where data lives
    fn describe(&self) -> String;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn read(&self) -> ExpenseResult<Vec<Record>> {
        (**self).read()
    }

    fn write(&self, records: &[Record]) -> ExpenseResult<()> {
        (**self).write(records)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// On-disk format of the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[default]
    Json,
    Csv,
}

impl StorageFormat {
    /// File extension used for data files in this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Infer the format from a file extension (`.csv` or `.json`)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Open a file backend of this format at `path`
    pub fn open(&self, path: PathBuf) -> Box<dyn StorageBackend> {
        match self {
            Self::Json => Box::new(JsonFileStorage::new(path)),
            Self::Csv => Box::new(CsvFileStorage::new(path)),
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
