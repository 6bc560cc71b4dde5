// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chat_scheduler::error::{AppError, ScheduleError};

#[test]
fn test_is_calendar_token_error_matches() {
    let err = AppError::CalendarApi(format!("{} (HTTP 401)", AppError::CALENDAR_TOKEN_ERROR));
    assert!(err.is_calendar_token_error());

    let err = AppError::CalendarApi(AppError::CALENDAR_TOKEN_ERROR.to_string());
    assert!(err.is_calendar_token_error());
}

#[test]
fn test_is_calendar_token_error_no_match() {
    let err = AppError::CalendarApi("HTTP 403 Forbidden: quota exceeded".to_string());
    assert!(!err.is_calendar_token_error());

    let err = AppError::CalendarApi("HTTP 500 Internal Server Error".to_string());
    assert!(!err.is_calendar_token_error());

    let err = AppError::BadRequest(AppError::CALENDAR_TOKEN_ERROR.to_string());
    assert!(!err.is_calendar_token_error());
}

#[test]
fn test_schedule_error_messages_are_user_facing() {
    assert_eq!(
        ScheduleError::Unauthenticated.to_string(),
        "User not authenticated"
    );
    assert_eq!(
        ScheduleError::StoreUnavailable.to_string(),
        "Database not initialized. Check server config."
    );
    assert_eq!(
        ScheduleError::ActivityNotFound.to_string(),
        "Activity not found."
    );
    assert!(ScheduleError::ActivityNotFound.is_not_found());
    assert!(!ScheduleError::Validation("x".to_string()).is_not_found());
}

#[test]
fn test_schedule_error_status_codes() {
    let status = |err: ScheduleError| AppError::from(err).into_response().status();

    assert_eq!(status(ScheduleError::Unauthenticated), StatusCode::BAD_REQUEST);
    assert_eq!(
        status(ScheduleError::Validation("Title cannot be empty".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(status(ScheduleError::ActivityNotFound), StatusCode::NOT_FOUND);
    assert_eq!(
        status(ScheduleError::StoreUnavailable),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status(ScheduleError::Store(AppError::Conflict)),
        StatusCode::CONFLICT
    );
}
