//! Spending aggregation over expense sets.

use std::collections::HashMap;

use serde::Serialize;

use super::{Category, Expense};

/// Aggregated spending: overall total plus per-category totals.
///
/// Categories with no matching expenses are absent from the map rather than
/// present with a zero value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_by_category: HashMap<Category, f64>,
    pub total_amount: f64,
}

/// Sum amounts over the given expenses, overall and per category.
///
/// Single forward pass; empty input yields a zero total and an empty map.
pub fn aggregate(expenses: &[Expense]) -> SpendingSummary {
    let mut total_by_category: HashMap<Category, f64> = HashMap::new();
    let mut total_amount = 0.0;

    for expense in expenses {
        *total_by_category.entry(expense.category).or_insert(0.0) += expense.amount;
        total_amount += expense.amount;
    }

    SpendingSummary {
        total_by_category,
        total_amount,
    }
}
