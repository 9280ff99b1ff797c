//! Export module for the expense tracker
//!
//! CSV export of the full expense collection.

pub mod csv;

pub use self::csv::{export_expenses_csv, EXPORT_HEADER};
