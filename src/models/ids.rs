//! Strongly-typed identifier for expenses
//!
//! Expense IDs are positive integers assigned by the repository. Wrapping them
//! in a newtype keeps them from being mixed up with counts or months.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a persisted expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(u64);

impl ExpenseId {
    /// Wrap a raw identifier value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw identifier value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The identifier that follows this one, or `None` at `u64::MAX`
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ExpenseId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ExpenseId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the "#12" form used in some listings
        let s = s.trim().strip_prefix('#').unwrap_or(s.trim());
        Ok(Self(s.parse()?))
    }
}
