use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// Malformed interval input. Rejected before any computation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(i64),
    #[error("end time must be after start time")]
    EndNotAfterStart,
    #[error("invalid time of day: {0}")]
    BadTime(String),
    #[error("invalid date: {0}")]
    BadDate(String),
    #[error("title required")]
    EmptyTitle,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store error: {0}")]
    Store(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
