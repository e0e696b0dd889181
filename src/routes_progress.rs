// --------------------------------------------------
// Progress and analytics endpoints.
//
// Daily records are recomputed by the schedule handlers; reads that
// find no stored record derive one on the fly from the day's
// instances (same function, nothing persisted).
// -------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::models::{Db, ProgressRecord};
use crate::progress::{self, ProgressSummary};
use crate::state::AppState;
use crate::store;
use crate::streak::StreakKey;

fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ValidationError::BadDate(s.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RollupQuery {
    pub user: Uuid,
    // window ends here; defaults to today
    pub end: Option<String>,
}

fn day_record(db: &Db, user: Uuid, date: NaiveDate) -> ProgressRecord {
    match db.progress_for(user, date) {
        Some(rec) => rec.clone(),
        None => progress::recompute_day(None, user, date, &db.schedules),
    }
}

#[derive(Debug, Serialize)]
pub struct DailyProgressResponse {
    pub progress: ProgressRecord,
    pub completion_rate_display: f64,
}

// -----------------------------
// GET /api/progress/:date?user=<uuid>
// -----------------------------
pub async fn get_progress(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(q): Query<UserQuery>,
) -> Result<Json<DailyProgressResponse>, AppError> {
    let date = parse_date(&date)?;
    let db = store::load_db(&state.db_path)?;
    let progress = day_record(&db, q.user, date);
    let completion_rate_display = progress.rounded_rate();
    Ok(Json(DailyProgressResponse {
        progress,
        completion_rate_display,
    }))
}

fn rollup_response(
    state: &AppState,
    q: &RollupQuery,
    days: u32,
) -> Result<ProgressSummary, AppError> {
    let end = match &q.end {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let db = store::load_db(&state.db_path)?;
    Ok(progress::rollup(q.user, end, days, &db.progress))
}

// -----------------------------
// GET /api/progress/weekly?user=<uuid>[&end=YYYY-MM-DD]
// Mean rate and summed minutes over the trailing 7 days
// -----------------------------
pub async fn get_weekly_progress(
    State(state): State<AppState>,
    Query(q): Query<RollupQuery>,
) -> Result<Json<ProgressSummary>, AppError> {
    Ok(Json(rollup_response(&state, &q, 7)?))
}

// -----------------------------
// GET /api/progress/monthly?user=<uuid>[&end=YYYY-MM-DD]
// Trailing 30 days
// -----------------------------
pub async fn get_monthly_progress(
    State(state): State<AppState>,
    Query(q): Query<RollupQuery>,
) -> Result<Json<ProgressSummary>, AppError> {
    Ok(Json(rollup_response(&state, &q, 30)?))
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: f64, // two-decimal display rounding
    pub total_time: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

// -----------------------------
// GET /api/analytics/summary?user=<uuid>
// Today's progress totals plus the daily streak counters
// -----------------------------
pub async fn get_analytics_summary(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let today = chrono::Local::now().date_naive();
    let db = store::load_db(&state.db_path)?;

    let progress = day_record(&db, q.user, today);
    let streak = db.streak_for(&StreakKey::daily(q.user));

    Ok(Json(AnalyticsSummary {
        total_tasks: progress.total_tasks,
        completed_tasks: progress.completed_tasks,
        completion_rate: progress.rounded_rate(),
        total_time: progress.total_time_minutes,
        current_streak: streak.map(|s| s.current_streak).unwrap_or(0),
        longest_streak: streak.map(|s| s.longest_streak).unwrap_or(0),
    }))
}
