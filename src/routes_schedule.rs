// --------------------------------------------------
// Handles API endpoints for dated schedule instances.
//
// Responsibilities:
// - List / create / update instances for a date
// - Complete an instance: folds the completion event into the daily
//   and per-task streaks and recomputes the day's progress
// - Reset an instance: replays streaks from history instead of
//   decrementing counters
// -------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::interval::Interval;
use crate::models::{ProgressRecord, ScheduleInstance, ScheduleStatus, StreakRecord};
use crate::progress;
use crate::state::AppState;
use crate::store;
use crate::streak::{self, StreakKey};

fn parse_hhmm(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ValidationError::BadTime(s.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ValidationError::BadDate(s.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub user: Uuid,
    pub date: String, // "YYYY-MM-DD"
}

#[derive(Debug, Serialize)]
pub struct SchedulesResponse {
    pub date: NaiveDate,
    pub schedules: Vec<ScheduleInstance>,
}

// -----------------------------
// GET /api/schedules?user=<uuid>&date=YYYY-MM-DD
// Returns the user's schedule instances for the date
// -----------------------------
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(q): Query<ScheduleQuery>,
) -> Result<Json<SchedulesResponse>, AppError> {
    let date = parse_date(&q.date)?;
    let db = store::load_db(&state.db_path)?;
    let schedules = db.instances_on(q.user, date).into_iter().cloned().collect();
    Ok(Json(SchedulesResponse { date, schedules }))
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleInput {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub date: String,       // "YYYY-MM-DD"
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
    pub notes: Option<String>,
}

// -----------------------------
// POST /api/schedules
// Creates a pending instance for a task on a date
// -----------------------------
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(input): Json<CreateScheduleInput>,
) -> Result<Json<ScheduleInstance>, AppError> {
    let date = parse_date(&input.date)?;
    let start_time = parse_hhmm(&input.start_time)?;
    let end_time = parse_hhmm(&input.end_time)?;
    Interval::from_bounds(start_time, end_time)?;

    let _guard = state.lock_user(input.user_id).await;
    let mut db = store::load_db(&state.db_path)?;

    if db.task_mut(input.task_id, input.user_id).is_none() {
        return Err(AppError::NotFound("task"));
    }

    let instance = ScheduleInstance {
        id: Uuid::new_v4(),
        task_id: input.task_id,
        user_id: input.user_id,
        date,
        start_time,
        end_time,
        status: ScheduleStatus::Pending,
        completed_at: None,
        notes: input.notes,
    };
    db.schedules.push(instance.clone());

    // the day's schedule set changed, so its aggregate is stale
    let record = progress::recompute_day(
        db.progress_for(input.user_id, date),
        input.user_id,
        date,
        &db.schedules,
    );
    db.upsert_progress(record);

    store::save_db(&state.db_path, &db)?;
    Ok(Json(instance))
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleInput {
    pub user_id: Uuid,
    pub start_time: Option<String>, // "HH:MM"
    pub end_time: Option<String>,   // "HH:MM"
    pub status: Option<ScheduleStatus>,
    pub notes: Option<String>,
}

// -----------------------------
// PUT /api/schedules/:id
// Partial update. Status edits here replay streaks from history
// rather than folding a single event.
// -----------------------------
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateScheduleInput>,
) -> Result<Json<ScheduleInstance>, AppError> {
    let start_time = input.start_time.as_deref().map(parse_hhmm).transpose()?;
    let end_time = input.end_time.as_deref().map(parse_hhmm).transpose()?;

    let _guard = state.lock_user(input.user_id).await;
    let mut db = store::load_db(&state.db_path)?;

    let Some(s) = db.instance_mut(id, input.user_id) else {
        return Err(AppError::NotFound("schedule"));
    };

    let new_start = start_time.unwrap_or(s.start_time);
    let new_end = end_time.unwrap_or(s.end_time);
    Interval::from_bounds(new_start, new_end)?;
    s.start_time = new_start;
    s.end_time = new_end;

    let status_changed = match input.status {
        Some(status) if status != s.status => {
            s.status = status;
            s.completed_at = if status == ScheduleStatus::Completed {
                Some(chrono::Local::now().fixed_offset())
            } else {
                None
            };
            true
        }
        _ => false,
    };
    if let Some(notes) = input.notes {
        s.notes = Some(notes);
    }
    let instance = s.clone();

    if status_changed {
        replay_streaks(&mut db, instance.user_id, instance.task_id);
    }
    let record = progress::recompute_day(
        db.progress_for(instance.user_id, instance.date),
        instance.user_id,
        instance.date,
        &db.schedules,
    );
    db.upsert_progress(record);

    store::save_db(&state.db_path, &db)?;
    Ok(Json(instance))
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub schedule: ScheduleInstance,
    pub daily_streak: StreakRecord,
    pub task_streak: StreakRecord,
    pub progress: ProgressRecord,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Uuid,
}

// -----------------------------
// POST /api/schedules/:id/complete?user=<uuid>
// Marks the instance completed, folds the event into both streak
// keys, and recomputes the day's progress. Safe to call twice:
// the streak fold is idempotent per calendar date.
// -----------------------------
pub async fn complete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<CompletionResponse>, AppError> {
    let _guard = state.lock_user(q.user).await;
    let mut db = store::load_db(&state.db_path)?;

    let Some(s) = db.instance_mut(id, q.user) else {
        return Err(AppError::NotFound("schedule"));
    };
    s.status = ScheduleStatus::Completed;
    s.completed_at = Some(chrono::Local::now().fixed_offset());
    let instance = s.clone();

    let daily_key = StreakKey::daily(q.user);
    let daily_streak = streak::apply_completion(db.streak_for(&daily_key), &daily_key, instance.date);
    db.upsert_streak(daily_streak.clone());

    let task_key = StreakKey::task(q.user, instance.task_id);
    let task_streak = streak::apply_completion(db.streak_for(&task_key), &task_key, instance.date);
    db.upsert_streak(task_streak.clone());

    let progress = progress::recompute_day(
        db.progress_for(q.user, instance.date),
        q.user,
        instance.date,
        &db.schedules,
    );
    db.upsert_progress(progress.clone());

    store::save_db(&state.db_path, &db)?;
    Ok(Json(CompletionResponse {
        schedule: instance,
        daily_streak,
        task_streak,
        progress,
    }))
}

// -----------------------------
// POST /api/schedules/:id/reset?user=<uuid>
// Explicit reset back to pending. Streak counters are rebuilt by
// replaying the remaining completion history; a single decrement
// would be wrong once out-of-order events have been folded.
// -----------------------------
pub async fn reset_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<CompletionResponse>, AppError> {
    let _guard = state.lock_user(q.user).await;
    let mut db = store::load_db(&state.db_path)?;

    let Some(s) = db.instance_mut(id, q.user) else {
        return Err(AppError::NotFound("schedule"));
    };
    s.status = ScheduleStatus::Pending;
    s.completed_at = None;
    let instance = s.clone();

    let (daily_streak, task_streak) = replay_streaks(&mut db, q.user, instance.task_id);

    let progress = progress::recompute_day(
        db.progress_for(q.user, instance.date),
        q.user,
        instance.date,
        &db.schedules,
    );
    db.upsert_progress(progress.clone());

    store::save_db(&state.db_path, &db)?;
    Ok(Json(CompletionResponse {
        schedule: instance,
        daily_streak,
        task_streak,
        progress,
    }))
}

// Rebuild the daily and per-task streaks from the stored completion
// history. Used whenever history changes other than by appending.
fn replay_streaks(
    db: &mut crate::models::Db,
    user_id: Uuid,
    task_id: Uuid,
) -> (StreakRecord, StreakRecord) {
    let daily_key = StreakKey::daily(user_id);
    let dates = db.completion_dates(&daily_key);
    let daily = streak::replay(db.streak_for(&daily_key), &daily_key, &dates);
    db.upsert_streak(daily.clone());

    let task_key = StreakKey::task(user_id, task_id);
    let dates = db.completion_dates(&task_key);
    let task = streak::replay(db.streak_for(&task_key), &task_key, &dates);
    db.upsert_streak(task.clone());

    (daily, task)
}
