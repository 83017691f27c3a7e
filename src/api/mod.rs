//! HTTP API for the expense tracker.
//!
//! ## Endpoints
//!
//! - `POST /expenses` - Record a new expense
//! - `GET /expenses` - List expenses, filtered by category and date range
//! - `GET /expenses/analysis` - Aggregate spending across all expenses
//! - `GET /reports/:type` - Report history for daily/weekly/monthly
//! - `GET /trigger-report` - Manually run a daily report generation
//! - `GET /health` - Health check

mod routes;
pub mod types;

pub use routes::{serve, AppState};
pub use types::*;
