//! Expense repository
//!
//! Owns the collection-level rules: unique IDs and whole-collection
//! persistence. Every operation re-reads the full collection from the backend
//! before answering, and every mutation rewrites it in full. There is no
//! in-memory cache.

use std::collections::HashSet;

use chrono::{Datelike, Local};
use tracing::Dispatch;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseId};

use super::{Record, StorageBackend};

/// Collection-wide expense operations
pub trait ExpenseRepository {
    /// Assign the next ID to `expense`, persist it, and return it with its ID
    fn add_expense(&self, expense: Expense) -> ExpenseResult<Expense>;

    /// Every stored expense, in stored order
    fn get_all_expenses(&self) -> ExpenseResult<Vec<Expense>>;

    /// Expenses whose category equals `category` exactly
    fn get_all_expenses_by_category(&self, category: &str) -> ExpenseResult<Vec<Expense>>;

    /// Remove the expense with `id`, failing with NotFound if there is none
    fn delete_expense(&self, id: ExpenseId) -> ExpenseResult<()>;

    /// Sum of all amounts; zero for an empty collection
    fn total_expense(&self) -> ExpenseResult<f64>;

    /// Sum of amounts in `month` of the current year
    fn total_expense_by_month(&self, month: u32) -> ExpenseResult<f64> {
        self.total_expense_by_month_and_year(month, Local::now().year())
    }

    /// Sum of amounts in `month` of `year`
    fn total_expense_by_month_and_year(&self, month: u32, year: i32) -> ExpenseResult<f64>;

    /// Persist an empty collection
    fn clear_all_expenses(&self) -> ExpenseResult<()>;
}

/// Repository over any [`StorageBackend`]
///
/// Log events are emitted through the injected dispatcher rather than
/// whatever subscriber happens to be global.
pub struct ExpenseStore<B> {
    backend: B,
    logger: Dispatch,
}

impl<B: StorageBackend> ExpenseStore<B> {
    /// Create a repository logging to the caller's current default dispatcher
    pub fn new(backend: B) -> Self {
        let logger = tracing::dispatcher::get_default(|current| current.clone());
        Self { backend, logger }
    }

    /// Replace the logging capability
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn log<F: FnOnce()>(&self, emit: F) {
        tracing::dispatcher::with_default(&self.logger, emit);
    }

    /// Read and validate the full collection
    fn load(&self) -> ExpenseResult<Vec<Expense>> {
        let records = self.backend.read()?;
        let count = records.len();

        let mut seen = HashSet::with_capacity(count);
        let mut expenses = Vec::with_capacity(count);

        for record in records {
            let expense = Expense::from_record(record)?;
            if let Some(id) = expense.id() {
                if !seen.insert(id) {
                    return Err(ExpenseError::Format(format!(
                        "Duplicate expense ID {} in {}",
                        id,
                        self.backend.describe()
                    )));
                }
            }
            expenses.push(expense);
        }

        self.log(|| tracing::debug!(count, source = %self.backend.describe(), "Loaded expenses"));
        Ok(expenses)
    }

    /// Rewrite the full collection
    fn save(&self, expenses: &[Expense]) -> ExpenseResult<()> {
        let records = expenses
            .iter()
            .map(Expense::to_record)
            .collect::<ExpenseResult<Vec<Record>>>()?;

        self.backend.write(&records)?;

        self.log(|| {
            tracing::debug!(
                count = records.len(),
                target_file = %self.backend.describe(),
                "Saved expenses"
            )
        });
        Ok(())
    }

    fn next_id(&self, expenses: &[Expense]) -> ExpenseResult<ExpenseId> {
        let max = expenses
            .iter()
            .filter_map(Expense::id)
            .max()
            .unwrap_or(ExpenseId::new(0));

        max.next().ok_or_else(|| {
            ExpenseError::Format(format!(
                "No expense ID is available after {} in {}",
                max,
                self.backend.describe()
            ))
        })
    }
}

impl<B: StorageBackend> ExpenseRepository for ExpenseStore<B> {
    fn add_expense(&self, mut expense: Expense) -> ExpenseResult<Expense> {
        let mut expenses = self.load()?;

        let id = self.next_id(&expenses)?;
        expense.assign_id(id);
        expenses.push(expense.clone());

        self.save(&expenses)?;
        self.log(|| tracing::info!("Expense added successfully (ID: {})", id));

        Ok(expense)
    }

    fn get_all_expenses(&self) -> ExpenseResult<Vec<Expense>> {
        self.load()
    }

    fn get_all_expenses_by_category(&self, category: &str) -> ExpenseResult<Vec<Expense>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|e| e.category() == Some(category))
            .collect())
    }

    fn delete_expense(&self, id: ExpenseId) -> ExpenseResult<()> {
        let mut expenses = self.load()?;
        let before = expenses.len();

        expenses.retain(|e| e.id() != Some(id));
        if expenses.len() == before {
            return Err(ExpenseError::expense_not_found(id));
        }

        self.save(&expenses)?;
        self.log(|| tracing::info!("Deleted the Expense with ID: {}", id));

        Ok(())
    }

    fn total_expense(&self) -> ExpenseResult<f64> {
        Ok(self.load()?.iter().map(Expense::amount).sum())
    }

    fn total_expense_by_month_and_year(&self, month: u32, year: i32) -> ExpenseResult<f64> {
        Ok(self
            .load()?
            .iter()
            .filter(|e| e.is_in_month(month, year))
            .map(Expense::amount)
            .sum())
    }

    fn clear_all_expenses(&self) -> ExpenseResult<()> {
        self.save(&[])?;
        self.log(|| tracing::info!("Cleared all expenses"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStorage, MemoryStorage};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use serde_json::json;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn create_test_repo() -> ExpenseStore<MemoryStorage> {
        ExpenseStore::new(MemoryStorage::new()).with_logger(Dispatch::none())
    }

    fn recent(days_ago: i64) -> NaiveDateTime {
        Local::now().naive_local() - Duration::days(days_ago)
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn expense(description: &str, amount: f64, category: Option<&str>) -> Expense {
        Expense::new(description, amount, category.map(String::from), recent(1)).unwrap()
    }

    #[test]
    fn test_empty_repository() {
        let repo = create_test_repo();
        assert!(repo.get_all_expenses().unwrap().is_empty());
        assert_eq!(repo.total_expense().unwrap(), 0.0);
        assert_eq!(repo.total_expense_by_month(1).unwrap(), 0.0);
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let repo = create_test_repo();

        let first = repo.add_expense(expense("Grocery", 5000.0, Some("Basic"))).unwrap();
        let second = repo.add_expense(expense("Rent", 10000.0, Some("Basic"))).unwrap();

        assert_eq!(first.id(), Some(ExpenseId::new(1)));
        assert_eq!(second.id(), Some(ExpenseId::new(2)));

        let all = repo.get_all_expenses().unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[test]
    fn test_add_round_trips_fields() {
        let repo = create_test_repo();
        let input = expense("Coffee", 3.75, None);

        let added = repo.add_expense(input.clone()).unwrap();
        let stored = repo.get_all_expenses().unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description(), input.description());
        assert_eq!(stored[0].amount(), input.amount());
        assert_eq!(stored[0].category(), None);
        assert_eq!(stored[0].date(), input.date());
        assert_eq!(stored[0], added);
    }

    #[test]
    fn test_next_id_is_max_plus_one_after_delete() {
        let repo = create_test_repo();
        repo.add_expense(expense("A", 1.0, None)).unwrap();
        repo.add_expense(expense("B", 2.0, None)).unwrap();
        repo.add_expense(expense("C", 3.0, None)).unwrap();

        // Deleting a gap doesn't get filled
        repo.delete_expense(ExpenseId::new(2)).unwrap();
        let d = repo.add_expense(expense("D", 4.0, None)).unwrap();
        assert_eq!(d.id(), Some(ExpenseId::new(4)));

        // Deleting the max does get reused, since the next ID is max + 1
        repo.delete_expense(ExpenseId::new(4)).unwrap();
        let e = repo.add_expense(expense("E", 5.0, None)).unwrap();
        assert_eq!(e.id(), Some(ExpenseId::new(4)));
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let repo = create_test_repo();
        let a = repo.add_expense(expense("A", 1.0, None)).unwrap();
        let b = repo.add_expense(expense("B", 2.0, None)).unwrap();
        let c = repo.add_expense(expense("C", 3.0, None)).unwrap();

        repo.delete_expense(ExpenseId::new(2)).unwrap();

        assert_eq!(repo.get_all_expenses().unwrap(), vec![a, c]);
        assert!(!repo.get_all_expenses().unwrap().contains(&b));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let repo = create_test_repo();
        repo.add_expense(expense("A", 1.0, None)).unwrap();

        let err = repo.delete_expense(ExpenseId::new(99)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Expense with ID 99 not found.");
        assert_eq!(repo.get_all_expenses().unwrap().len(), 1);

        // Not idempotent
        repo.delete_expense(ExpenseId::new(1)).unwrap();
        assert!(repo.delete_expense(ExpenseId::new(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_category_filter_is_exact() {
        let repo = create_test_repo();
        repo.add_expense(expense("Grocery", 10.0, Some("Food"))).unwrap();
        repo.add_expense(expense("Snacks", 5.0, Some("food"))).unwrap();
        repo.add_expense(expense("Dinner", 30.0, Some("Food & Drink"))).unwrap();
        repo.add_expense(expense("Bus", 2.0, None)).unwrap();

        let food = repo.get_all_expenses_by_category("Food").unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].description(), "Grocery");

        assert!(repo.get_all_expenses_by_category("Travel").unwrap().is_empty());
    }

    #[test]
    fn test_total_expense() {
        let repo = create_test_repo();
        repo.add_expense(expense("Grocery", 5000.0, Some("Basic"))).unwrap();
        repo.add_expense(expense("Rent", 10000.0, Some("Basic"))).unwrap();

        assert_eq!(repo.total_expense().unwrap(), 15000.0);
    }

    #[test]
    fn test_total_by_month_and_year() {
        let repo = create_test_repo();
        let add = |description: &str, amount: f64, date: NaiveDateTime| {
            repo.add_expense(Expense::new(description, amount, None, date).unwrap())
                .unwrap();
        };

        let year = Local::now().year() - 2;
        add("Gift", 120.0, at(year, 12, 3));
        add("Party", 80.0, at(year, 12, 31));
        add("Rent", 1000.0, at(year + 1, 1, 1));
        add("Other December", 7.0, at(year - 1, 12, 15));

        assert_eq!(repo.total_expense_by_month_and_year(12, year).unwrap(), 200.0);
        assert_eq!(repo.total_expense_by_month_and_year(1, year + 1).unwrap(), 1000.0);
        assert_eq!(repo.total_expense_by_month_and_year(2, year + 1).unwrap(), 0.0);
        assert_eq!(repo.total_expense().unwrap(), 1207.0);
    }

    #[test]
    fn test_total_by_month_defaults_to_current_year() {
        let repo = create_test_repo();
        let now = Local::now().naive_local();
        let last_year = now.checked_sub_months(chrono::Months::new(12)).unwrap();

        repo.add_expense(Expense::new("This year", 40.0, None, now).unwrap())
            .unwrap();
        repo.add_expense(Expense::new("Last year", 60.0, None, last_year).unwrap())
            .unwrap();

        assert_eq!(repo.total_expense_by_month(now.month()).unwrap(), 40.0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let repo = create_test_repo();
        repo.add_expense(expense("A", 1.0, None)).unwrap();

        repo.clear_all_expenses().unwrap();
        assert!(repo.get_all_expenses().unwrap().is_empty());

        repo.clear_all_expenses().unwrap();
        assert!(repo.get_all_expenses().unwrap().is_empty());

        let next = repo.add_expense(expense("B", 2.0, None)).unwrap();
        assert_eq!(next.id(), Some(ExpenseId::new(1)));
    }

    #[test]
    fn test_reads_reflect_external_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenses.json");
        let repo = ExpenseStore::new(JsonFileStorage::new(&path)).with_logger(Dispatch::none());
        let other = ExpenseStore::new(JsonFileStorage::new(&path)).with_logger(Dispatch::none());

        repo.add_expense(expense("A", 1.0, None)).unwrap();
        other.add_expense(expense("B", 2.0, None)).unwrap();

        let all = repo.get_all_expenses().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id(), Some(ExpenseId::new(2)));
    }

    #[test]
    fn test_invalid_persisted_data_propagates() {
        let record = json!({
            "id": 1,
            "date": recent(1).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "amount": 0.0,
            "description": "Free lunch",
            "category": null
        });
        let storage = MemoryStorage::with_records(vec![record.as_object().unwrap().clone()]);
        let repo = ExpenseStore::new(storage).with_logger(Dispatch::none());

        assert!(repo.get_all_expenses().unwrap_err().is_validation());
        assert!(repo.total_expense().unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_persisted_ids_are_format_error() {
        let date = recent(1).format("%Y-%m-%dT%H:%M:%S").to_string();
        let records = (0..2)
            .map(|_| {
                json!({"id": 5, "date": date, "amount": 1.0, "description": "Dup", "category": null})
                    .as_object()
                    .unwrap()
                    .clone()
            })
            .collect();
        let repo = ExpenseStore::new(MemoryStorage::with_records(records)).with_logger(Dispatch::none());

        assert!(repo.get_all_expenses().unwrap_err().is_format());
    }

    #[test]
    fn test_exhausted_id_space_is_format_error() {
        let record = json!({
            "id": u64::MAX,
            "date": recent(1).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "amount": 1.0,
            "description": "Last",
            "category": null
        });
        let storage = MemoryStorage::with_records(vec![record.as_object().unwrap().clone()]);
        let repo = ExpenseStore::new(storage).with_logger(Dispatch::none());

        let err = repo.add_expense(expense("Next", 2.0, None)).unwrap_err();
        assert!(err.is_format());

        // Nothing was written, so the collection still loads
        let all = repo.get_all_expenses().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), Some(ExpenseId::new(u64::MAX)));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_logs_through_injected_dispatcher() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        let repo = ExpenseStore::new(MemoryStorage::new()).with_logger(Dispatch::new(subscriber));
        repo.add_expense(expense("Grocery", 5.0, None)).unwrap();
        repo.delete_expense(ExpenseId::new(1)).unwrap();

        let log = captured.contents();
        assert!(log.contains("Expense added successfully (ID: 1)"));
        assert!(log.contains("Deleted the Expense with ID: 1"));
        assert!(!log.contains("Loaded expenses"));
    }
}
