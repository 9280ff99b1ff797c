//! Display formatting for terminal output
//!
//! Provides utilities for formatting expenses for terminal display, as plain
//! lines or as a table.

pub mod expense;

pub use expense::{
    format_added_expense, format_amount, format_expense_list, format_expense_row,
    format_expense_table, format_summary,
};
