//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::expense::{self, analysis, filter, Expense, ExpenseStore, NewExpense, ValidationError};
use crate::report::{self, Period, ReportSnapshot, ReportStore};
use crate::schedule;

use super::types::*;

/// Shared application state.
///
/// The two stores are the only mutable state in the process; handlers and
/// scheduler tasks serialize access through the locks.
pub struct AppState {
    pub config: Config,
    /// Expense records, insertion-ordered
    pub expenses: RwLock<ExpenseStore>,
    /// Generated report histories, one per period
    pub reports: RwLock<ReportStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            expenses: RwLock::new(ExpenseStore::new()),
            reports: RwLock::new(ReportStore::new()),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message.to_string())),
    )
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone()));

    schedule::spawn_report_jobs(Arc::clone(&state));

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/expenses/analysis", get(analyze_expenses))
        .route("/reports/:type", get(get_reports))
        .route("/trigger-report", get(trigger_report))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Record a new expense.
async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewExpense>,
) -> Result<(StatusCode, Json<DataResponse<Expense>>), ApiError> {
    let mut expenses = state.expenses.write().await;
    match expenses.add(input) {
        Ok(expense) => Ok((StatusCode::CREATED, Json(DataResponse::success(expense)))),
        Err(e) => {
            tracing::debug!("Rejected expense: {}", e);
            Err(bad_request(e))
        }
    }
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// List expenses, optionally narrowed by category and date range.
async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<DataResponse<Vec<Expense>>>, ApiError> {
    // Empty query values count as absent, like the rest of the filters.
    let category = params.category.as_deref().filter(|s| !s.is_empty());
    let start = parse_query_date(params.start_date.as_deref())?;
    let end = parse_query_date(params.end_date.as_deref())?;

    let expenses = state.expenses.read().await;
    let filtered = filter::filter_expenses(expenses.all(), category, start, end);
    Ok(Json(DataResponse::success(filtered)))
}

fn parse_query_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => expense::parse_date(s)
            .map(Some)
            .ok_or_else(|| bad_request(ValidationError::InvalidDate)),
    }
}

/// Aggregate spending across all recorded expenses.
async fn analyze_expenses(
    State(state): State<Arc<AppState>>,
) -> Json<DataResponse<analysis::SpendingSummary>> {
    let expenses = state.expenses.read().await;
    Json(DataResponse::success(analysis::aggregate(expenses.all())))
}

/// Fetch the accumulated report history for one period.
async fn get_reports(
    State(state): State<Arc<AppState>>,
    Path(report_type): Path<String>,
) -> Result<Json<DataResponse<Vec<ReportSnapshot>>>, ApiError> {
    let period: Period = report_type.parse().map_err(bad_request)?;
    let reports = state.reports.read().await;
    Ok(Json(DataResponse::success(reports.get(period).to_vec())))
}

/// Manually run a daily report generation.
async fn trigger_report(State(state): State<Arc<AppState>>) -> &'static str {
    let now = Utc::now();
    let expenses = state.expenses.read().await;
    let mut reports = state.reports.write().await;
    report::generate(Period::Daily, now, &expenses, &mut reports);
    "Report triggered!"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    fn new_expense(category: &str, amount: serde_json::Value, date: &str) -> NewExpense {
        NewExpense {
            category: Some(category.to_string()),
            amount: Some(amount),
            date: Some(date.to_string()),
        }
    }

    async fn seed(state: &Arc<AppState>, entries: &[(&str, f64, &str)]) {
        let mut expenses = state.expenses.write().await;
        for (category, amount, date) in entries {
            expenses
                .add(new_expense(category, json!(amount), date))
                .expect("valid seed expense");
        }
    }

    #[tokio::test]
    async fn create_expense_returns_created_with_envelope() {
        let state = test_state();
        let (status, Json(body)) = create_expense(
            State(Arc::clone(&state)),
            Json(new_expense("Food", json!(12.5), "2024-03-01")),
        )
        .await
        .expect("valid expense");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.status, "success");
        assert_eq!(body.data.id, 1);
        assert_eq!(body.data.amount, 12.5);
        assert_eq!(state.expenses.read().await.len(), 1);
    }

    #[tokio::test]
    async fn create_expense_rejects_invalid_category() {
        let state = test_state();
        let (status, Json(body)) = create_expense(
            State(Arc::clone(&state)),
            Json(new_expense("Rent", json!(12.5), "2024-03-01")),
        )
        .await
        .expect_err("unknown category must be rejected");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
        assert_eq!(body.message, "Invalid category");
        assert!(state.expenses.read().await.is_empty());
    }

    #[tokio::test]
    async fn list_expenses_applies_query_filters() {
        let state = test_state();
        seed(
            &state,
            &[
                ("Food", 10.0, "2024-03-01"),
                ("Travel", 5.0, "2024-03-01"),
                ("Food", 20.0, "2024-03-11"),
            ],
        )
        .await;

        let Json(body) = list_expenses(
            State(Arc::clone(&state)),
            Query(ExpenseQuery {
                category: Some("Food".to_string()),
                ..Default::default()
            }),
        )
        .await
        .expect("query succeeds");
        let ids: Vec<u64> = body.data.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);

        // Same-day range keeps both day-0 expenses.
        let Json(body) = list_expenses(
            State(Arc::clone(&state)),
            Query(ExpenseQuery {
                start_date: Some("2024-03-01".to_string()),
                end_date: Some("2024-03-01".to_string()),
                ..Default::default()
            }),
        )
        .await
        .expect("query succeeds");
        let ids: Vec<u64> = body.data.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn list_expenses_treats_empty_params_as_absent() {
        let state = test_state();
        seed(&state, &[("Food", 10.0, "2024-03-01")]).await;

        let Json(body) = list_expenses(
            State(state),
            Query(ExpenseQuery {
                category: Some(String::new()),
                start_date: Some(String::new()),
                end_date: Some(String::new()),
            }),
        )
        .await
        .expect("query succeeds");
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn list_expenses_rejects_malformed_dates() {
        let state = test_state();
        let (status, Json(body)) = list_expenses(
            State(state),
            Query(ExpenseQuery {
                start_date: Some("soon".to_string()),
                end_date: Some("2024-03-01".to_string()),
                ..Default::default()
            }),
        )
        .await
        .expect_err("malformed date must be rejected");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid date");
    }

    #[tokio::test]
    async fn analysis_covers_the_whole_store() {
        let state = test_state();
        seed(
            &state,
            &[
                ("Food", 10.0, "2024-03-01"),
                ("Travel", 5.0, "2024-03-01"),
                ("Food", 20.0, "2024-03-11"),
            ],
        )
        .await;

        let Json(body) = analyze_expenses(State(state)).await;
        assert_eq!(body.data.total_amount, 35.0);

        let value = serde_json::to_value(&body.data).expect("serializable");
        assert_eq!(value["totalByCategory"]["Food"], 30.0);
        assert_eq!(value["totalByCategory"]["Travel"], 5.0);
    }

    #[tokio::test]
    async fn reports_endpoint_rejects_unknown_type() {
        let state = test_state();
        let (status, Json(body)) = get_reports(State(state), Path("yearly".to_string()))
            .await
            .expect_err("yearly is not a report type");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
        assert_eq!(body.message, "Invalid report type");
    }

    #[tokio::test]
    async fn trigger_report_appends_a_daily_snapshot() {
        let state = test_state();
        seed(&state, &[("Food", 10.0, "2024-03-01")]).await;

        let ack = trigger_report(State(Arc::clone(&state))).await;
        assert_eq!(ack, "Report triggered!");

        let reports = state.reports.read().await;
        assert_eq!(reports.get(Period::Daily).len(), 1);
        assert!(reports.get(Period::Weekly).is_empty());
    }

    #[tokio::test]
    async fn report_history_accumulates_in_generation_order() {
        let state = test_state();

        trigger_report(State(Arc::clone(&state))).await;
        trigger_report(State(Arc::clone(&state))).await;

        let Json(body) = get_reports(State(Arc::clone(&state)), Path("daily".to_string()))
            .await
            .expect("daily is valid");
        assert_eq!(body.data.len(), 2);
        assert!(body.data[0].generated_at <= body.data[1].generated_at);
    }
}
