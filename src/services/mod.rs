//! Service layer for the expense tracker
//!
//! The service layer is a thin façade over the repository used by the CLI.

pub mod expense;

pub use expense::ExpenseService;
