//! In-memory backend
//!
//! Keeps the collection in process memory. Used by tests and anywhere a
//! throwaway collection is enough.

use std::sync::RwLock;

use crate::error::{ExpenseError, ExpenseResult};

use super::{Record, StorageBackend};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<Vec<Record>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self) -> ExpenseResult<Vec<Record>> {
        let records = self
            .records
            .read()
            .map_err(|e| ExpenseError::Io(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.clone())
    }

    fn write(&self, records: &[Record]) -> ExpenseResult<()> {
        let mut stored = self
            .records
            .write()
            .map_err(|e| ExpenseError::Io(format!("Failed to acquire write lock: {}", e)))?;

        *stored = records.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory storage".to_string()
    }
}
