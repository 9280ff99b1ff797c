//! Expense service
//!
//! Translates primitive inputs into entity construction and repository calls.
//! Field validation happens in [`Expense`]; not-found and storage failures come
//! from the repository. Nothing is checked here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::error::{ExpenseError, ExpenseResult};
use crate::export::csv::export_expenses_csv;
use crate::models::{Expense, ExpenseId};
use crate::storage::ExpenseRepository;

/// Service for expense management
pub struct ExpenseService<R> {
    repository: R,
}

impl<R: ExpenseRepository> ExpenseService<R> {
    /// Create a new expense service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Record a new expense
    ///
    /// `date` defaults to the moment of the call. An empty category is treated
    /// as no category.
    pub fn add_expense(
        &self,
        description: &str,
        amount: f64,
        category: Option<&str>,
        date: Option<NaiveDateTime>,
    ) -> ExpenseResult<Expense> {
        let date = date.unwrap_or_else(|| Local::now().naive_local());
        let category = category.filter(|c| !c.is_empty()).map(String::from);

        let expense = Expense::new(description, amount, category, date)?;
        self.repository.add_expense(expense)
    }

    /// List expenses, optionally restricted to one category
    pub fn list_expenses(&self, category: Option<&str>) -> ExpenseResult<Vec<Expense>> {
        match category.filter(|c| !c.is_empty()) {
            Some(category) => self.repository.get_all_expenses_by_category(category),
            None => self.repository.get_all_expenses(),
        }
    }

    /// Total spending, all-time or for one month
    ///
    /// Without a month the year is ignored. With a month but no year, the
    /// current year is used.
    pub fn summary(&self, month: Option<u32>, year: Option<i32>) -> ExpenseResult<f64> {
        match (month, year) {
            (Some(month), Some(year)) => self.repository.total_expense_by_month_and_year(month, year),
            (Some(month), None) => self.repository.total_expense_by_month(month),
            (None, _) => self.repository.total_expense(),
        }
    }

    pub fn delete(&self, id: ExpenseId) -> ExpenseResult<()> {
        self.repository.delete_expense(id)
    }

    pub fn clear_all_expenses(&self) -> ExpenseResult<()> {
        self.repository.clear_all_expenses()
    }

    /// Write every expense as CSV to `writer`, returning the row count
    pub fn export_to_csv<W: Write>(&self, writer: W) -> ExpenseResult<usize> {
        let expenses = self.repository.get_all_expenses()?;
        export_expenses_csv(&expenses, writer)?;
        Ok(expenses.len())
    }

    /// Write every expense as CSV to a file at `path`
    pub fn export_to_csv_file(&self, path: &Path) -> ExpenseResult<usize> {
        // Read first so a storage failure doesn't leave an empty export behind
        let expenses = self.repository.get_all_expenses()?;

        let file = File::create(path).map_err(|e| {
            ExpenseError::Export(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        export_expenses_csv(&expenses, BufWriter::new(file))?;

        Ok(expenses.len())
    }
}
