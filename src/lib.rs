//! Expense Tracker - personal expense tracking from the command line
//!
//! This library provides the core functionality for the `expense-tracker`
//! binary: recording, listing, summarizing, deleting and exporting expenses
//! persisted to a local JSON file.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: The validated expense entity
//! - `storage`: Storage backends and the expense repository
//! - `services`: Thin façade used by the CLI
//! - `export`: CSV export
//! - `display`: Terminal formatting
//! - `logging`: Construction of the injected tracing dispatcher
//! - `cli`: Command definitions and handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::services::ExpenseService;
//! use expense_tracker::storage::{ExpenseStore, JsonFileStorage};
//!
//! let service = ExpenseService::new(ExpenseStore::new(JsonFileStorage::new("expenses.json")));
//! let expense = service.add_expense("Grocery", 5000.0, Some("Basic"), None)?;
//! assert_eq!(service.summary(None, None)?, 5000.0);
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
