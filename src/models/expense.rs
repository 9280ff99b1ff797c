//! Expense model
//!
//! An expense is validated when it is constructed, so any `Expense` value that
//! exists satisfies the field constraints. IDs are left empty until the
//! repository assigns one.

use chrono::{Datelike, Local, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ExpenseId;
use crate::error::{ExpenseError, ExpenseResult};
use crate::storage::Record;

/// Largest accepted amount (inclusive)
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Maximum category length in characters
pub const MAX_CATEGORY_LEN: usize = 100;

/// How far back an expense date may lie, in calendar months
pub const MAX_AGE_MONTHS: u32 = 120;

/// ISO-8601 layout used for persisted timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single recorded expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    id: Option<ExpenseId>,

    #[serde(with = "timestamp")]
    date: NaiveDateTime,

    amount: f64,

    description: String,

    category: Option<String>,
}

/// Shape of an expense as persisted, before validation
#[derive(Debug, Deserialize)]
struct StoredExpense {
    #[serde(default)]
    id: Option<ExpenseId>,
    #[serde(with = "timestamp")]
    date: NaiveDateTime,
    amount: f64,
    description: String,
    #[serde(default)]
    category: Option<String>,
}

impl Expense {
    /// Create a new, not yet persisted expense validated against the current time
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: Option<String>,
        date: NaiveDateTime,
    ) -> Result<Self, ValidationErrors> {
        Self::new_at(description, amount, category, date, Local::now().naive_local())
    }

    /// Create a new expense, validating the date against `now`
    pub fn new_at(
        description: impl Into<String>,
        amount: f64,
        category: Option<String>,
        date: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationErrors> {
        let description = description.into();

        let errors: Vec<ExpenseValidationError> = [
            validate_date(date, now),
            validate_amount(amount),
            validate_description(&description),
            validate_category(category.as_deref()),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(Self {
            id: None,
            date,
            amount,
            description,
            category,
        })
    }

    /// Rebuild an expense from a persisted record
    ///
    /// Records that do not match the expense schema, or that lack a positive
    /// ID, are format errors. Records that match the schema but break a field
    /// constraint are validation errors.
    pub fn from_record(record: Record) -> ExpenseResult<Self> {
        let stored: StoredExpense = serde_json::from_value(serde_json::Value::Object(record))
            .map_err(|e| ExpenseError::Format(format!("Invalid expense record: {}", e)))?;

        let id = match stored.id {
            Some(id) if id.value() > 0 => id,
            Some(id) => {
                return Err(ExpenseError::Format(format!(
                    "Invalid expense record: ID must be positive, got {}",
                    id
                )))
            }
            None => {
                return Err(ExpenseError::Format(
                    "Invalid expense record: missing ID".into(),
                ))
            }
        };

        let mut expense = Self::new(
            stored.description,
            stored.amount,
            stored.category,
            stored.date,
        )?;
        expense.id = Some(id);
        Ok(expense)
    }

    /// Convert to the generic record written by storage backends
    pub fn to_record(&self) -> ExpenseResult<Record> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ExpenseError::Format(format!(
                "Expense serialized to a non-object value: {}",
                other
            ))),
        }
    }

    pub fn id(&self) -> Option<ExpenseId> {
        self.id
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Check whether the expense date falls in the given calendar month
    pub fn is_in_month(&self, month: u32, year: i32) -> bool {
        self.date.month() == month && self.date.year() == year
    }

    /// Set the repository-assigned ID
    pub(crate) fn assign_id(&mut self, id: ExpenseId) {
        self.id = Some(id);
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.amount)
    }
}

/// Reject dates in the future or older than [`MAX_AGE_MONTHS`]
pub fn validate_date(
    date: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), ExpenseValidationError> {
    if date > now {
        return Err(ExpenseValidationError::FutureDate(date));
    }

    if let Some(oldest) = now.checked_sub_months(Months::new(MAX_AGE_MONTHS)) {
        if date < oldest {
            return Err(ExpenseValidationError::DateTooOld(date));
        }
    }

    Ok(())
}

/// Require `0 < amount <= MAX_AMOUNT`; NaN fails both comparisons
pub fn validate_amount(amount: f64) -> Result<(), ExpenseValidationError> {
    if !(amount > 0.0) {
        return Err(ExpenseValidationError::NonPositiveAmount(amount));
    }

    if amount > MAX_AMOUNT {
        return Err(ExpenseValidationError::AmountTooLarge(amount));
    }

    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ExpenseValidationError> {
    let len = description.chars().count();

    if len == 0 {
        return Err(ExpenseValidationError::EmptyDescription);
    }

    if len > MAX_DESCRIPTION_LEN {
        return Err(ExpenseValidationError::DescriptionTooLong(len));
    }

    Ok(())
}

pub fn validate_category(category: Option<&str>) -> Result<(), ExpenseValidationError> {
    match category.map(|c| c.chars().count()) {
        Some(len) if len > MAX_CATEGORY_LEN => Err(ExpenseValidationError::CategoryTooLong(len)),
        _ => Ok(()),
    }
}

/// A single field constraint violation
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    FutureDate(NaiveDateTime),
    DateTooOld(NaiveDateTime),
    NonPositiveAmount(f64),
    AmountTooLarge(f64),
    EmptyDescription,
    DescriptionTooLong(usize),
    CategoryTooLong(usize),
}

impl ExpenseValidationError {
    /// Name of the field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            Self::FutureDate(_) | Self::DateTooOld(_) => "date",
            Self::NonPositiveAmount(_) | Self::AmountTooLarge(_) => "amount",
            Self::EmptyDescription | Self::DescriptionTooLong(_) => "description",
            Self::CategoryTooLong(_) => "category",
        }
    }
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FutureDate(date) => write!(f, "Date {} is in the future", date),
            Self::DateTooOld(date) => write!(
                f,
                "Date {} is more than {} years in the past",
                date,
                MAX_AGE_MONTHS / 12
            ),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than 0 (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Amount must be at most {} (got {})",
                MAX_AMOUNT, amount
            ),
            Self::EmptyDescription => write!(f, "Description cannot be empty"),
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::CategoryTooLong(len) => write!(
                f,
                "Category too long ({} chars, max {})",
                len, MAX_CATEGORY_LEN
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

/// All field violations found while constructing one expense
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ExpenseValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ExpenseValidationError] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpenseValidationError> {
        self.0.iter()
    }

    /// Check whether any violation concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl From<Vec<ExpenseValidationError>> for ValidationErrors {
    fn from(errors: Vec<ExpenseValidationError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Serde adapter for ISO-8601 timestamps
///
/// Writes local naive timestamps. Reads either a naive timestamp or an
/// RFC 3339 timestamp with offset, which is converted to local time.
pub(crate) mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Local).naive_local())
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}
