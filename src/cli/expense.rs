//! Expense CLI commands
//!
//! Implements the add/list/summary/delete/export/clear commands on top of
//! [`ExpenseService`].

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_added_expense, format_expense_list, format_expense_table, format_summary,
};
use crate::error::ExpenseResult;
use crate::models::expense::timestamp;
use crate::models::ExpenseId;
use crate::services::ExpenseService;
use crate::storage::ExpenseRepository;

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Add a new expense
    Add {
        /// Description of the expense
        #[arg(long)]
        description: String,
        /// Amount of the expense
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Category of the expense
        #[arg(long)]
        category: Option<String>,
        /// Date of the expense (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDateTime>,
    },

    /// List all expenses
    List {
        /// Only show expenses in this category
        #[arg(long)]
        category: Option<String>,
        /// Render as a table
        #[arg(long)]
        table: bool,
    },

    /// Show total expense summary
    Summary {
        /// Restrict the summary to a month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Year of the month, defaults to the current year
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },

    /// Delete an expense by ID
    Delete {
        /// ID of the expense to delete
        #[arg(long)]
        id: ExpenseId,
    },

    /// Export expenses to a CSV file
    Export {
        /// Path to save the exported CSV file
        #[arg(long)]
        file_path: PathBuf,
    },

    /// Clear all expenses
    Clear,
}

/// Parse a `--date` value: a full timestamp or a bare date (midnight)
pub fn parse_date(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    timestamp::parse(value)
}

/// Handle an expense command
pub fn handle_expense_command<R: ExpenseRepository>(
    service: &ExpenseService<R>,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> ExpenseResult<()> {
    match cmd {
        ExpenseCommands::Add {
            description,
            amount,
            category,
            date,
        } => {
            let expense = service.add_expense(&description, amount, category.as_deref(), date)?;
            println!("{}", format_added_expense(&expense));
        }

        ExpenseCommands::List { category, table } => {
            let expenses = service.list_expenses(category.as_deref())?;
            if table {
                print!("{}", format_expense_table(&expenses, &settings.date_format));
            } else {
                print!("{}", format_expense_list(&expenses, &settings.date_format));
            }
        }

        ExpenseCommands::Summary { month, year } => {
            let total = service.summary(month, year)?;
            println!("{}", format_summary(total));
        }

        ExpenseCommands::Delete { id } => {
            service.delete(id)?;
            println!("Deleted expense with ID: {}", id);
        }

        ExpenseCommands::Export { file_path } => {
            let count = service.export_to_csv_file(&file_path)?;
            tracing::debug!(count, "Exported expenses to CSV");
            println!("Expenses exported successfully to {}", file_path.display());
        }

        ExpenseCommands::Clear => {
            service.clear_all_expenses()?;
            println!("All expenses cleared.");
        }
    }

    Ok(())
}
