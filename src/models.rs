use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
    Completed,
    Skipped,
    Overdue,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreakKind {
    Daily,
    Task,
}

// Recurring activity template with a daily time-of-day and duration.
// `recurrence` is an opaque tag ("daily", "weekly", ...) and is never
// expanded into occurrences here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub start_time: NaiveTime,
    pub duration_min: i64,
    pub recurrence: Option<String>,
    pub priority: Priority,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub notes: Option<String>,
}

// Concrete dated occurrence of a task. end_time > start_time.
// Status moves forward only, except the explicit reset endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInstance {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ScheduleStatus,
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub notes: Option<String>,
}

// Derived streak counters. Reproducible by replaying the completion-date
// history; the stored record is a cache, not the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: StreakKind,
    pub task_id: Option<Uuid>, // None for daily-kind
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: Option<NaiveDate>,
}

// Per-day aggregate, recomputed from the day's schedule instances.
// completion_rate is stored at full precision; rounding is display-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: f64,
    pub total_time_minutes: i64,
}

impl ProgressRecord {
    /// Completion rate rounded to two decimals for display.
    pub fn rounded_rate(&self) -> f64 {
        (self.completion_rate * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Db {
    pub tasks: Vec<Task>,
    pub schedules: Vec<ScheduleInstance>,
    pub streaks: Vec<StreakRecord>,
    pub progress: Vec<ProgressRecord>,
}
