//! # 리포트 요약
//!
//! 최근 `days`일(기본 30일) 동안의 활동을 집계합니다.
//! 기간은 `[지금 - days, 지금]`이며 양 끝을 포함합니다.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{ReportQuery, ReportSummary};
use crate::services::validation::to_db_timestamp;

pub const DEFAULT_REPORT_DAYS: i64 = 30;
/// 기간 계산이 넘치지 않도록 상한을 둡니다 (약 100년).
const MAX_REPORT_DAYS: i64 = 36_500;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub async fn build_summary(pool: &SqlitePool, query: &ReportQuery) -> Result<ReportSummary, AppError> {
    let days = query.days.unwrap_or(DEFAULT_REPORT_DAYS);
    if !(1..=MAX_REPORT_DAYS).contains(&days) {
        return Err(AppError::validation(format!(
            "days must be between 1 and {}",
            MAX_REPORT_DAYS
        )));
    }
    let include_zero = query.include_zero.unwrap_or(false);

    let now = Utc::now().naive_utc();
    let from_ts = to_db_timestamp(&(now - Duration::days(days)));
    let to_ts = to_db_timestamp(&now);

    let mut conn = pool.acquire().await?;

    let requests_created = db::count_requests_created(&mut conn, &from_ts, &to_ts).await?;
    let request_views = db::count_views(&mut conn, &from_ts, &to_ts).await?;
    let request_shortlists = db::count_shortlists_added(&mut conn, &from_ts, &to_ts).await?;
    let matches_created = db::count_matches_created(&mut conn, &from_ts, &to_ts).await?;
    let matches_completed = db::count_matches_completed(&mut conn, &from_ts, &to_ts).await?;
    let status_snapshot = db::request_status_snapshot(&mut conn, &from_ts, &to_ts).await?;
    let avg_time_to_completion_days = db::avg_completion_seconds(&mut conn, &from_ts, &to_ts)
        .await?
        .map(|secs| secs / SECONDS_PER_DAY);
    let by_location = db::count_requests_by_location(&mut conn, &from_ts, &to_ts).await?;
    let by_category =
        db::count_requests_by_category(&mut conn, &from_ts, &to_ts, include_zero).await?;
    let new_csrs = db::users::count_new_csrs(&mut conn, &from_ts, &to_ts).await?;
    let active_csrs = db::users::count_active_csrs(&mut conn, &from_ts, &to_ts).await?;

    Ok(ReportSummary {
        from_ts,
        to_ts,
        requests_created,
        request_views,
        request_shortlists,
        matches_created,
        matches_completed,
        status_snapshot,
        avg_time_to_completion_days,
        by_location,
        by_category,
        new_csrs,
        active_csrs,
    })
}
