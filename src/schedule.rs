//! Background report generation at fixed wall-clock boundaries.
//!
//! One tokio task per period, each a sequential loop: sleep until the next
//! boundary, then generate a report. The schedule mirrors a classic cron
//! setup, all in UTC: daily at midnight, weekly on Sunday at midnight,
//! monthly on the first of the month at midnight.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use tracing::info;

use crate::api::AppState;
use crate::report::{self, Period};

/// Spawn one report-generation loop per period.
pub fn spawn_report_jobs(state: Arc<AppState>) {
    for period in [Period::Daily, Period::Weekly, Period::Monthly] {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            run_period_loop(state, period).await;
        });
    }
}

async fn run_period_loop(state: Arc<AppState>, period: Period) {
    loop {
        let fire_at = next_fire_time(period, Utc::now());
        let wait = (fire_at - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        let now = Utc::now();
        info!("{} report job triggered", period);

        let expenses = state.expenses.read().await;
        let mut reports = state.reports.write().await;
        let snapshot = report::generate(period, now, &expenses, &mut reports);
        info!(
            "{} report generated: total {:.2} across {} categories",
            period,
            snapshot.total_amount,
            snapshot.total_by_category.len()
        );
    }
}

/// First wall-clock boundary for `period` strictly after `after`.
pub fn next_fire_time(period: Period, after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive();
    let date = match period {
        Period::Daily => today + Days::new(1),
        Period::Weekly => {
            // Next Sunday; today's own midnight has already passed.
            let days = (7 - u64::from(today.weekday().num_days_from_sunday())) % 7;
            today + Days::new(if days == 0 { 7 } else { days })
        }
        Period::Monthly => {
            let first_of_month = today.with_day(1).unwrap_or(today);
            first_of_month + Months::new(1)
        }
    };
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::parse_date;

    #[test]
    fn daily_fires_at_next_midnight() {
        let after = parse_date("2024-03-15T14:30:45Z").unwrap();
        assert_eq!(
            next_fire_time(Period::Daily, after),
            parse_date("2024-03-16T00:00:00Z").unwrap()
        );

        // Exactly at midnight the next boundary is a full day away.
        let after = parse_date("2024-03-15T00:00:00Z").unwrap();
        assert_eq!(
            next_fire_time(Period::Daily, after),
            parse_date("2024-03-16T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn weekly_fires_on_the_next_sunday() {
        // 2024-03-15 is a Friday.
        let after = parse_date("2024-03-15T14:30:45Z").unwrap();
        let fire = next_fire_time(Period::Weekly, after);
        assert_eq!(fire, parse_date("2024-03-17T00:00:00Z").unwrap());
        assert_eq!(fire.date_naive().weekday(), chrono::Weekday::Sun);

        // On a Sunday the job targets the following Sunday.
        let after = parse_date("2024-03-17T08:00:00Z").unwrap();
        assert_eq!(
            next_fire_time(Period::Weekly, after),
            parse_date("2024-03-24T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn monthly_fires_on_the_first_of_next_month() {
        let after = parse_date("2024-03-15T14:30:45Z").unwrap();
        assert_eq!(
            next_fire_time(Period::Monthly, after),
            parse_date("2024-04-01T00:00:00Z").unwrap()
        );

        // Year rollover.
        let after = parse_date("2024-12-31T23:59:59Z").unwrap();
        assert_eq!(
            next_fire_time(Period::Monthly, after),
            parse_date("2025-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn fire_times_are_strictly_in_the_future() {
        let after = parse_date("2024-03-01T00:00:00Z").unwrap();
        for period in [Period::Daily, Period::Weekly, Period::Monthly] {
            assert!(next_fire_time(period, after) > after);
        }
    }
}
