// Define data modules
mod conflict; // Time-conflict detection for task create / update
mod error; // Error taxonomy and HTTP mapping
mod interval; // Minute-resolution half-open intervals
mod models; // Data structures (Task, ScheduleInstance, StreakRecord, ...)
mod progress; // Daily aggregates and weekly / monthly rollups
mod routes_progress; // HTTP handlers for progress & analytics APIs
mod routes_schedule; // HTTP handlers for schedule instance APIs
mod routes_streaks; // HTTP handlers for streak APIs
mod routes_tasks; // HTTP handlers for task APIs
mod state; // Shared handler state and per-user locks
mod store; // Persistent storage (load/save db.json) and queries
mod streak; // Streak counters from completion events

// Import axum routing utilities and Router
use axum::{
    routing::{get, post, put}, // HTTP method helpers
    Router,                    // Main router type
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path =
        std::env::var("DAYTRACK_DB").unwrap_or_else(|_| store::DEFAULT_DB_PATH.to_string());
    let addr = std::env::var("DAYTRACK_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let state = AppState::new(PathBuf::from(&db_path));

    let api = Router::new()
        // tasks
        .route(
            "/tasks",
            get(routes_tasks::list_tasks).post(routes_tasks::create_task),
        )
        .route("/tasks/conflicts", get(routes_tasks::check_conflicts))
        .route(
            "/tasks/:id",
            put(routes_tasks::update_task).delete(routes_tasks::delete_task),
        )
        .route("/tasks/:id/complete", post(routes_tasks::complete_task))
        .route("/tasks/:id/uncomplete", post(routes_tasks::uncomplete_task))
        // schedules
        .route(
            "/schedules",
            get(routes_schedule::list_schedules).post(routes_schedule::create_schedule),
        )
        .route("/schedules/:id", put(routes_schedule::update_schedule))
        .route(
            "/schedules/:id/complete",
            post(routes_schedule::complete_schedule),
        )
        .route("/schedules/:id/reset", post(routes_schedule::reset_schedule))
        // streaks
        .route("/streaks", get(routes_streaks::list_streaks))
        .route("/streaks/daily", get(routes_streaks::get_daily_streak))
        // progress
        .route(
            "/progress/weekly",
            get(routes_progress::get_weekly_progress),
        )
        .route(
            "/progress/monthly",
            get(routes_progress::get_monthly_progress),
        )
        .route("/progress/:date", get(routes_progress::get_progress))
        .route(
            "/analytics/summary",
            get(routes_progress::get_analytics_summary),
        );

    let app = Router::new().nest("/api", api).with_state(state);

    tracing::info!(addr = %addr, db = %db_path, "server running");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}
