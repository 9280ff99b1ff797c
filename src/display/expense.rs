//! Expense display formatting
//!
//! Line formats follow the `Key: value` layout printed by the CLI. Missing
//! categories show as `None`.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Expense;

/// Format an amount with the shortest exact representation (`5000`, `12.5`)
pub fn format_amount(amount: f64) -> String {
    amount.to_string()
}

fn category_or_none(expense: &Expense) -> &str {
    expense.category().unwrap_or("None")
}

fn id_or_none(expense: &Expense) -> String {
    expense
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "None".to_string())
}

/// Confirmation line for a newly added expense
pub fn format_added_expense(expense: &Expense) -> String {
    format!(
        "Added expense: ID={}, Description={}, Amount={}, Category={}",
        id_or_none(expense),
        expense.description(),
        format_amount(expense.amount()),
        category_or_none(expense)
    )
}

/// Format a single expense as one line
pub fn format_expense_row(expense: &Expense, date_format: &str) -> String {
    format!(
        "ID: {}, Description: {}, Amount: {}, Category: {}, Date: {}",
        id_or_none(expense),
        expense.description(),
        format_amount(expense.amount()),
        category_or_none(expense),
        expense.date().format(date_format)
    )
}

/// Format a list of expenses, one per line
pub fn format_expense_list(expenses: &[Expense], date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::from("Expenses:\n");
    for expense in expenses {
        output.push_str(&format_expense_row(expense, date_format));
        output.push('\n');
    }
    output
}

#[derive(Tabled)]
struct ExpenseTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format expenses as a table with a total line underneath
pub fn format_expense_table(expenses: &[Expense], date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|expense| ExpenseTableRow {
        id: id_or_none(expense),
        date: expense.date().format(date_format).to_string(),
        description: expense.description().to_string(),
        category: category_or_none(expense).to_string(),
        amount: format_amount(expense.amount()),
    });

    let total: f64 = expenses.iter().map(Expense::amount).sum();

    let mut table = Table::new(rows);
    table.with(Style::sharp());

    format!("{}\nTotal: {}\n", table, format_amount(total))
}

/// Summary line for a total
pub fn format_summary(total: f64) -> String {
    format!("Total expense: {}", format_amount(total))
}
