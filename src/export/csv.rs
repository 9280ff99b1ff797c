//! CSV Export functionality
//!
//! Exports the expense collection to a spreadsheet-compatible CSV file.

use std::io::Write;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::expense::TIMESTAMP_FORMAT;
use crate::models::Expense;

/// Column header of exported files
pub const EXPORT_HEADER: [&str; 5] = ["ID", "Description", "Category", "Amount", "Date"];

fn export_error(e: impl std::fmt::Display) -> ExpenseError {
    ExpenseError::Export(e.to_string())
}

/// Export expenses to CSV, one row per expense in collection order
pub fn export_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> ExpenseResult<()> {
    let mut writer = ::csv::Writer::from_writer(writer);

    writer.write_record(EXPORT_HEADER).map_err(export_error)?;

    for expense in expenses {
        writer
            .write_record([
                expense.id().map(|id| id.to_string()).unwrap_or_default(),
                expense.description().to_string(),
                expense.category().unwrap_or_default().to_string(),
                expense.amount().to_string(),
                expense.date().format(TIMESTAMP_FORMAT).to_string(),
            ])
            .map_err(export_error)?;
    }

    writer.flush().map_err(export_error)
}
