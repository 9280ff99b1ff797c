//! Core data models for the expense tracker
//!
//! The expense entity and its identifier. Validation lives here so that the
//! service and CLI layers never check field constraints themselves.

pub mod expense;
pub mod ids;

pub use expense::{Expense, ExpenseValidationError, ValidationErrors};
pub use ids::ExpenseId;
