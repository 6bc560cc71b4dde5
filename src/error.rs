// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Calendar API error: {0}")]
    CalendarApi(String),

    #[error("Intent oracle error: {0}")]
    Oracle(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A versioned write lost a race with another writer.
    #[error("Schedule was modified concurrently")]
    Conflict,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message prefix used when the calendar rejects the access token.
    pub const CALENDAR_TOKEN_ERROR: &'static str = "Calendar access token rejected";

    /// Returns true if this is a calendar auth failure (expired or revoked token).
    pub fn is_calendar_token_error(&self) -> bool {
        matches!(self, AppError::CalendarApi(msg) if msg.starts_with(Self::CALENDAR_TOKEN_ERROR))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::CalendarApi(msg) => {
                (StatusCode::BAD_GATEWAY, "calendar_error", Some(msg.clone()))
            }
            AppError::Oracle(msg) => (StatusCode::BAD_GATEWAY, "oracle_error", Some(msg.clone())),
            AppError::Conflict => (StatusCode::CONFLICT, "conflict", None),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a single schedule operation.
///
/// The display strings are shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Database not initialized. Check server config.")]
    StoreUnavailable,

    #[error("{0}")]
    Validation(String),

    #[error("Activity not found.")]
    ActivityNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl ScheduleError {
    /// Lookup misses are reported as a `message`, everything else as an `error`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScheduleError::ActivityNotFound)
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Store(inner) => inner,
            ScheduleError::ActivityNotFound => AppError::NotFound(err.to_string()),
            ScheduleError::StoreUnavailable => AppError::Database(err.to_string()),
            ScheduleError::Unauthenticated | ScheduleError::Validation(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
