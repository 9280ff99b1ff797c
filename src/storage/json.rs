//! JSON file backend
//!
//! The data file is a JSON array of expense objects. An absent or empty file
//! is an empty collection.

use std::path::{Path, PathBuf};

use crate::error::ExpenseResult;

use super::file_io::{read_json, write_json_atomic};
use super::{Record, StorageBackend};

/// Stores the collection as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileStorage {
    fn read(&self) -> ExpenseResult<Vec<Record>> {
        read_json(&self.path)
    }

    fn write(&self, records: &[Record]) -> ExpenseResult<()> {
        write_json_atomic(&self.path, &records)
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}
