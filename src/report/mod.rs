//! Periodic spending reports: windows, snapshots, and their histories.
//!
//! Each report period maps to a time window ending at the generation
//! instant. Generation filters the expense store through that window,
//! aggregates it, and appends an immutable snapshot to the period's
//! history. Generation is deliberately not idempotent: every invocation
//! appends, whether it came from the scheduler or a manual trigger.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expense::{analysis, filter, Category, ExpenseStore};

/// Failures in the reporting subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid report type")]
    UnknownPeriod,
}

/// Report period: both a history bucket and a window policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(ReportError::UnknownPeriod),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable aggregation result in a report history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    /// Which history this snapshot belongs to
    pub period: Period,

    /// When the snapshot was computed (also the window's upper bound)
    pub generated_at: DateTime<Utc>,

    /// Total spending inside the window
    pub total_amount: f64,

    /// Per-category totals; categories absent from the window are omitted
    pub total_by_category: HashMap<Category, f64>,
}

/// Append-only report histories, one per period, in generation order.
#[derive(Debug, Default)]
pub struct ReportStore {
    daily: Vec<ReportSnapshot>,
    weekly: Vec<ReportSnapshot>,
    monthly: Vec<ReportSnapshot>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot to the history named by its period.
    pub fn append(&mut self, snapshot: ReportSnapshot) {
        match snapshot.period {
            Period::Daily => self.daily.push(snapshot),
            Period::Weekly => self.weekly.push(snapshot),
            Period::Monthly => self.monthly.push(snapshot),
        }
    }

    /// Full accumulated history for one period, oldest first.
    pub fn get(&self, period: Period) -> &[ReportSnapshot] {
        match period {
            Period::Daily => &self.daily,
            Period::Weekly => &self.weekly,
            Period::Monthly => &self.monthly,
        }
    }
}

/// Lower bound of the report window ending at `now`.
///
/// Daily windows reach back to midnight UTC of the previous day. Weekly and
/// monthly windows are shifted by a fixed span from `now` with no
/// truncation to calendar boundaries.
pub fn window_start(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        Period::Daily => (now - Duration::days(1))
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc(),
        Period::Weekly => now - Duration::days(7),
        // checked_sub_months clamps the day when the previous month is shorter
        Period::Monthly => now.checked_sub_months(Months::new(1)).unwrap_or(now),
    }
}

/// Compute and record a report snapshot for `period` as of `now`.
///
/// Selects all expenses dated within `[window_start, now]` regardless of
/// category, aggregates them, and appends the result to the matching
/// history. Every call appends exactly one snapshot; the expense store is
/// not touched.
pub fn generate(
    period: Period,
    now: DateTime<Utc>,
    expenses: &ExpenseStore,
    reports: &mut ReportStore,
) -> ReportSnapshot {
    let start = window_start(period, now);
    let in_window = filter::filter_expenses(expenses.all(), None, Some(start), Some(now));
    let summary = analysis::aggregate(&in_window);

    let snapshot = ReportSnapshot {
        period,
        generated_at: now,
        total_amount: summary.total_amount,
        total_by_category: summary.total_by_category,
    };
    reports.append(snapshot.clone());
    snapshot
}
