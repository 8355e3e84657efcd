use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests, slow down")]
    RateLimited,

    #[error("Test schedule {schedule_id} is not currently available")]
    ScheduleNotOpen { schedule_id: Uuid },

    #[error("Attempt {attempt_id} has already been completed")]
    AlreadyCompleted { attempt_id: Uuid },

    #[error("Time limit for attempt {attempt_id} has expired")]
    TimeExpired { attempt_id: Uuid, schedule_id: Uuid },

    #[error("No active attempt for this test schedule")]
    NoActiveAttempt,

    #[error("Attempt {attempt_id} has not been completed")]
    AttemptNotCompleted { attempt_id: Uuid },

    #[error("An attempt already exists for this employee and schedule")]
    DuplicateAttemptConflict,

    #[error("No employee profile exists for user {user_id}")]
    MissingProfile { user_id: Uuid },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code rendered in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::RateLimited => "rate_limit_exceeded",
            Error::ScheduleNotOpen { .. } => "schedule_not_open",
            Error::AlreadyCompleted { .. } => "already_completed",
            Error::TimeExpired { .. } => "time_expired",
            Error::NoActiveAttempt => "no_active_attempt",
            Error::AttemptNotCompleted { .. } => "attempt_not_completed",
            Error::DuplicateAttemptConflict => "duplicate_attempt",
            Error::MissingProfile { .. } => "missing_profile",
            Error::Database(_) => "database_error",
            Error::Validation(_) => "validation_error",
            Error::Json(_) => "invalid_json",
            Error::Token(_) => "invalid_token",
            Error::PasswordHash(_) => "internal_error",
            Error::Anyhow(_) => "bad_request",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Where the client should navigate next, for the recoverable exam errors.
    pub fn redirect(&self) -> Option<String> {
        match self {
            Error::ScheduleNotOpen { .. } | Error::NoActiveAttempt => {
                Some("/api/employee/dashboard".to_string())
            }
            Error::AlreadyCompleted { attempt_id } => Some(format!("/api/results/{}", attempt_id)),
            Error::TimeExpired { schedule_id, .. } => {
                Some(format!("/api/exam/{}/submit", schedule_id))
            }
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) | Error::Anyhow(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) | Error::Token(_) | Error::MissingProfile { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden(_) | Error::ScheduleNotOpen { .. } => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::NoActiveAttempt => StatusCode::NOT_FOUND,
            Error::Conflict(_)
            | Error::AlreadyCompleted { .. }
            | Error::AttemptNotCompleted { .. }
            | Error::DuplicateAttemptConflict => StatusCode::CONFLICT,
            Error::TimeExpired { .. } => StatusCode::GONE,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::Config(_) | Error::Database(_) | Error::PasswordHash(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            Error::Database(err) => {
                tracing::error!(error = ?err, "Database error");
                "A database error occurred".to_string()
            }
            Error::Config(_) | Error::PasswordHash(_) | Error::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": self.code(),
            "message": message,
        });
        if let Some(redirect) = self.redirect() {
            body["redirect"] = json!(redirect);
        }
        if matches!(self, Error::MissingProfile { .. }) {
            body["logout"] = json!(true);
        }
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::PasswordHash(err)
    }
}

/// True when `err` is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
