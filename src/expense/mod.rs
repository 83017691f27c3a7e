//! Expense records and the append-only in-memory store.
//!
//! Expenses are validated on entry, assigned sequential ids, and never
//! mutated or deleted afterwards. The store lives for the process lifetime;
//! there is no persistence.

pub mod analysis;
pub mod filter;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures when recording an expense.
///
/// The display text of each variant is the message surfaced to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid category")]
    InvalidCategory,

    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("Invalid date")]
    InvalidDate,
}

/// The fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Entertainment,
    Utilities,
    Other,
}

impl Category {
    /// Canonical name, as it appears in JSON and in filter matching.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    /// Case-sensitive exact match against the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food" => Ok(Category::Food),
            "Travel" => Ok(Category::Travel),
            "Entertainment" => Ok(Category::Entertainment),
            "Utilities" => Ok(Category::Utilities),
            "Other" => Ok(Category::Other),
            _ => Err(ValidationError::InvalidCategory),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// Sequential id, assigned at creation, starting at 1
    pub id: u64,

    /// Expense category
    pub category: Category,

    /// Positive amount
    pub amount: f64,

    /// When the expense occurred (UTC)
    pub date: DateTime<Utc>,
}

/// Raw expense input, exactly as received from transport.
///
/// All fields are optional so that missing-field detection is part of
/// validation rather than deserialization. The amount is kept as a raw JSON
/// value because both numbers and numeric strings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExpense {
    pub category: Option<String>,
    pub amount: Option<serde_json::Value>,
    pub date: Option<String>,
}

/// Parse a caller-supplied date string into a UTC timestamp.
///
/// Accepts RFC 3339, a naive datetime (taken as UTC), or a bare date
/// (taken as midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN).and_utc());
    }
    None
}

fn parse_amount(raw: &serde_json::Value) -> Option<f64> {
    let amount = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if amount.is_finite() && amount > 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// Append-only store of expense records, insertion-ordered.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record a new expense, returning a copy of the stored
    /// record.
    ///
    /// Checks run in order: all fields present, category known, amount a
    /// strictly positive number (JSON number or numeric string), date
    /// parseable. The store is untouched on any failure.
    pub fn add(&mut self, input: NewExpense) -> Result<Expense, ValidationError> {
        let (Some(category), Some(amount), Some(date)) =
            (input.category, input.amount, input.date)
        else {
            return Err(ValidationError::MissingFields);
        };

        let category: Category = category.parse()?;
        let amount = parse_amount(&amount).ok_or(ValidationError::InvalidAmount)?;
        let date = parse_date(&date).ok_or(ValidationError::InvalidDate)?;

        let expense = Expense {
            id: self.expenses.len() as u64 + 1,
            category,
            amount,
            date,
        };
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    /// All recorded expenses, in insertion order.
    pub fn all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}
