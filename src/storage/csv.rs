//! CSV file backend
//!
//! Alternate on-disk format with one row per expense and a header row.
//! Empty category cells map to `null`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExpenseError, ExpenseResult};

use super::file_io::{read_non_empty, write_atomic};
use super::{Record, StorageBackend};

const HEADER: [&str; 5] = ["id", "date", "amount", "description", "category"];

/// Row layout shared by reads and writes
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: Option<u64>,
    date: String,
    amount: f64,
    description: String,
    category: Option<String>,
}

impl CsvRow {
    fn from_record(record: &Record) -> ExpenseResult<Self> {
        serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| ExpenseError::Format(format!("Record cannot be stored as CSV: {}", e)))
    }

    fn into_record(self) -> Record {
        let mut record = Record::new();
        record.insert("id".into(), self.id.map_or(Value::Null, Value::from));
        record.insert("date".into(), Value::String(self.date));
        record.insert("amount".into(), Value::from(self.amount));
        record.insert("description".into(), Value::String(self.description));
        record.insert(
            "category".into(),
            self.category
                .filter(|c| !c.is_empty())
                .map_or(Value::Null, Value::String),
        );
        record
    }
}

/// Stores the collection as a CSV file
#[derive(Debug, Clone)]
pub struct CsvFileStorage {
    path: PathBuf,
}

impl CsvFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for CsvFileStorage {
    fn read(&self) -> ExpenseResult<Vec<Record>> {
        let Some(contents) = read_non_empty(&self.path)? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::Reader::from_reader(contents.as_bytes());
        let mut records = Vec::new();

        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| {
                ExpenseError::Format(format!(
                    "{} row {} is malformed: {}",
                    self.path.display(),
                    index + 1,
                    e
                ))
            })?;
            records.push(row.into_record());
        }

        Ok(records)
    }

    fn write(&self, records: &[Record]) -> ExpenseResult<()> {
        let rows = records
            .iter()
            .map(CsvRow::from_record)
            .collect::<ExpenseResult<Vec<_>>>()?;

        write_atomic(&self.path, |file| {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);

            writer.write_record(HEADER)?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}
