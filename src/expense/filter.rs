//! Expense selection by category and date range.

use chrono::{DateTime, Utc};

use super::Expense;

/// Select the expenses matching the given criteria, preserving input order.
///
/// A category narrows to exact, case-sensitive matches against the
/// category's canonical name; an unknown string simply matches nothing. The
/// date range applies only when both bounds are present and is inclusive on
/// both ends. Criteria compose by AND.
pub fn filter_expenses(
    expenses: &[Expense],
    category: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<Expense> {
    let mut filtered: Vec<Expense> = expenses.to_vec();

    if let Some(category) = category {
        filtered.retain(|expense| expense.category.as_str() == category);
    }

    // A single bound is ignored entirely; date filtering needs both.
    if let (Some(start), Some(end)) = (start, end) {
        filtered.retain(|expense| expense.date >= start && expense.date <= end);
    }

    filtered
}
