//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expense;

pub use expense::{handle_expense_command, ExpenseCommands};

use crate::error::ExpenseError;

/// Message shown to the user for errors they can fix themselves
///
/// Validation failures produce one line per field. Returns `None` for
/// storage, format and configuration errors, which are not user input
/// mistakes.
pub fn user_error_message(err: &ExpenseError) -> Option<String> {
    match err {
        ExpenseError::Validation(errors) => Some(
            errors
                .iter()
                .map(|e| format!("Error in field '{}': {}", e.field(), e))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ExpenseError::NotFound { .. } => Some(format!("Error: {}", err)),
        _ => None,
    }
}
