// --------------------------------------------------
// Handles API endpoints related to task CRUD operations
// and the advisory time-conflict check.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Complete / uncomplete tasks (the completion flag only;
//   schedule-level completion drives streaks and progress)
// - Report time conflicts on create / update without blocking
// -------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conflict::{self, ConflictEntry};
use crate::error::{AppError, ValidationError};
use crate::interval::Interval;
use crate::models::{Priority, Task};
use crate::progress;
use crate::state::AppState;
use crate::store;
use crate::streak::StreakKey;

fn parse_hhmm(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ValidationError::BadTime(s.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

// -----------------------------
// GET /api/tasks?user=<uuid>
// Returns all tasks owned by the user
// -----------------------------
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<TasksResponse>, AppError> {
    let db = store::load_db(&state.db_path)?;
    let tasks = db.tasks_for_user(q.user).into_iter().cloned().collect();
    Ok(Json(TasksResponse { tasks }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub user_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub start_time: String, // "HH:MM"
    pub duration_min: i64,
    pub recurrence: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskWithConflicts {
    pub task: Task,
    // advisory: the task is stored even when this is non-empty
    pub conflicts: Vec<ConflictEntry>,
}

// -----------------------------
// POST /api/tasks
// Creates a task; the response carries any time conflicts as a warning
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTaskInput>,
) -> Result<Json<TaskWithConflicts>, AppError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    let start_time = parse_hhmm(&input.start_time)?;
    let candidate = Interval::from_start_duration(start_time, input.duration_min)?;

    let _guard = state.lock_user(input.user_id).await;
    let mut db = store::load_db(&state.db_path)?;

    let conflicts = conflict::find_conflicts(candidate, input.user_id, &db.tasks, None);
    if !conflicts.is_empty() {
        tracing::info!(user = %input.user_id, count = conflicts.len(), "task created with conflicts");
    }

    let task = Task {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        title: input.title,
        category: input.category,
        start_time,
        duration_min: input.duration_min,
        recurrence: input.recurrence,
        priority: input.priority.unwrap_or(Priority::Medium),
        is_completed: false,
        completed_at: None,
        created_at: chrono::Local::now().fixed_offset(),
        notes: input.notes,
    };
    db.tasks.push(task.clone());
    store::save_db(&state.db_path, &db)?;

    Ok(Json(TaskWithConflicts { task, conflicts }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskInput {
    pub user_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub start_time: String, // "HH:MM"
    pub duration_min: i64,
    pub recurrence: Option<String>,
    pub priority: Priority,
    pub notes: Option<String>,
}

// -----------------------------
// PUT /api/tasks/:id
// Updates an existing task; conflicts exclude the task itself
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<TaskWithConflicts>, AppError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    let start_time = parse_hhmm(&input.start_time)?;
    let candidate = Interval::from_start_duration(start_time, input.duration_min)?;

    let _guard = state.lock_user(input.user_id).await;
    let mut db = store::load_db(&state.db_path)?;

    let conflicts = conflict::find_conflicts(candidate, input.user_id, &db.tasks, Some(id));

    let Some(t) = db.task_mut(id, input.user_id) else {
        return Err(AppError::NotFound("task"));
    };
    t.title = input.title;
    t.category = input.category;
    t.start_time = start_time;
    t.duration_min = input.duration_min;
    t.recurrence = input.recurrence;
    t.priority = input.priority;
    t.notes = input.notes;
    let task = t.clone();

    store::save_db(&state.db_path, &db)?;
    Ok(Json(TaskWithConflicts { task, conflicts }))
}

// -----------------------------
// DELETE /api/tasks/:id?user=<uuid>
// Removes the task, its schedule instances, and its per-task streak;
// progress for the affected dates is recomputed
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = state.lock_user(q.user).await;
    let mut db = store::load_db(&state.db_path)?;

    let before = db.tasks.len();
    db.tasks.retain(|t| !(t.id == id && t.user_id == q.user));
    if db.tasks.len() == before {
        return Err(AppError::NotFound("task"));
    }

    let mut affected_dates: Vec<chrono::NaiveDate> = db
        .schedules
        .iter()
        .filter(|s| s.task_id == id)
        .map(|s| s.date)
        .collect();
    affected_dates.sort();
    affected_dates.dedup();

    db.schedules.retain(|s| s.task_id != id);
    db.streaks.retain(|r| r.task_id != Some(id));

    for date in affected_dates {
        let record = progress::recompute_day(
            db.progress_for(q.user, date),
            q.user,
            date,
            &db.schedules,
        );
        db.upsert_progress(record);
    }

    // daily streak may have depended on this task's completions
    let daily = StreakKey::daily(q.user);
    let dates = db.completion_dates(&daily);
    let replayed = crate::streak::replay(db.streak_for(&daily), &daily, &dates);
    db.upsert_streak(replayed);

    store::save_db(&state.db_path, &db)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/tasks/:id/complete?user=<uuid>
// Sets the completion flag; completed tasks stop conflicting
// -----------------------------
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<Task>, AppError> {
    let _guard = state.lock_user(q.user).await;
    let mut db = store::load_db(&state.db_path)?;

    let Some(t) = db.task_mut(id, q.user) else {
        return Err(AppError::NotFound("task"));
    };
    t.is_completed = true;
    t.completed_at = Some(chrono::Local::now().fixed_offset());
    let task = t.clone();

    store::save_db(&state.db_path, &db)?;
    Ok(Json(task))
}

// -----------------------------
// POST /api/tasks/:id/uncomplete?user=<uuid>
// Clears the completion flag
// -----------------------------
pub async fn uncomplete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<Json<Task>, AppError> {
    let _guard = state.lock_user(q.user).await;
    let mut db = store::load_db(&state.db_path)?;

    let Some(t) = db.task_mut(id, q.user) else {
        return Err(AppError::NotFound("task"));
    };
    t.is_completed = false;
    t.completed_at = None;
    let task = t.clone();

    store::save_db(&state.db_path, &db)?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
pub struct ConflictQuery {
    pub user: Uuid,
    pub start: String, // "HH:MM"
    pub duration_min: i64,
    pub exclude: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub conflicts: Vec<ConflictEntry>,
}

// -----------------------------
// GET /api/tasks/conflicts?user=&start=HH:MM&duration_min=&exclude=
// Pure advisory query, no side effects
// -----------------------------
pub async fn check_conflicts(
    State(state): State<AppState>,
    Query(q): Query<ConflictQuery>,
) -> Result<Json<ConflictResponse>, AppError> {
    let start = parse_hhmm(&q.start)?;
    let candidate = Interval::from_start_duration(start, q.duration_min)?;

    let db = store::load_db(&state.db_path)?;
    let conflicts = conflict::find_conflicts(candidate, q.user, &db.tasks, q.exclude);
    Ok(Json(ConflictResponse { conflicts }))
}
