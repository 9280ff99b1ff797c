//! Custom error types for the expense tracker
//!
//! This module defines the error hierarchy for the application using thiserror.
//! Errors raised by the entity, storage and repository layers propagate
//! unchanged up to the CLI.

use thiserror::Error;

use crate::models::ValidationErrors;

/// The main error type for expense tracker operations
#[derive(Error, Debug)]
pub enum ExpenseError {
    /// One or more expense fields violated their constraints
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Entity not found errors
    #[error("{entity_type} with ID {identifier} not found.")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Backing file could not be read or written
    #[error("I/O error: {0}")]
    Io(String),

    /// Persisted content is malformed or does not match the expense schema
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl ExpenseError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.to_string(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

impl From<std::io::Error> for ExpenseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExpenseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<csv::Error> for ExpenseError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::Io(err.to_string())
        } else {
            Self::Format(err.to_string())
        }
    }
}

/// Result type alias for expense tracker operations
pub type ExpenseResult<T> = Result<T, ExpenseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseValidationError;

    #[test]
    fn test_error_display() {
        let err = ExpenseError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ExpenseError::expense_not_found(7);
        assert_eq!(err.to_string(), "Expense with ID 7 not found.");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_error() {
        let errors = ValidationErrors::from(vec![ExpenseValidationError::EmptyDescription]);
        let err: ExpenseError = errors.into();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Validation error: "));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExpenseError = io_err.into();
        assert!(matches!(err, ExpenseError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ExpenseError = json_err.into();
        assert!(err.is_format());
    }
}
