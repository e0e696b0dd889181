// --------------------------------------------------
// Read-only streak endpoints. Counters are maintained by the
// schedule completion / reset handlers.
// -------------------------------------------------

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::StreakRecord;
use crate::state::AppState;
use crate::store;
use crate::streak::StreakKey;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StreaksResponse {
    pub streaks: Vec<StreakRecord>,
}

// -----------------------------
// GET /api/streaks?user=<uuid>
// All streak records for the user (daily plus per-task)
// -----------------------------
pub async fn list_streaks(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<StreaksResponse>, AppError> {
    let db = store::load_db(&state.db_path)?;
    let streaks = db.streaks_for_user(q.user).into_iter().cloned().collect();
    Ok(Json(StreaksResponse { streaks }))
}

#[derive(Debug, Serialize)]
pub struct DailyStreakResponse {
    // null until the user's first completion creates the record
    pub streak: Option<StreakRecord>,
}

// -----------------------------
// GET /api/streaks/daily?user=<uuid>
// -----------------------------
pub async fn get_daily_streak(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<DailyStreakResponse>, AppError> {
    let db = store::load_db(&state.db_path)?;
    let streak = db.streak_for(&StreakKey::daily(q.user)).cloned();
    Ok(Json(DailyStreakResponse { streak }))
}
