// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct schedule routes used by the schedule view. These bypass the oracle.

use super::{ClientContext, JsonBody};
use crate::error::{AppError, Result, ScheduleError};
use crate::models::activity::optional_id;
use crate::models::{Activity, ActivityUpdates};
use crate::services::{OperationResult, RequestContext};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/schedule", get(get_schedule))
        .route("/api/activities/update", post(update_activity))
        .route("/api/activities/delete", post(delete_activity))
}

#[derive(Debug, Deserialize)]
pub struct UpdateActivityRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub updates: ActivityUpdates,
    #[serde(flatten)]
    pub client: ClientContext,
}

#[derive(Debug, Deserialize)]
pub struct DeleteActivityRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub client: ClientContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub user_id: Option<String>,
}

/// Operation failures are reported in the body; store faults become errors.
fn operation_response(
    outcome: std::result::Result<OperationResult, ScheduleError>,
) -> Result<Json<OperationResult>> {
    match outcome {
        Err(ScheduleError::Store(e)) => Err(e),
        other => Ok(Json(OperationResult::from_outcome(other))),
    }
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<UpdateActivityRequest>,
) -> Result<Json<OperationResult>> {
    let ctx = RequestContext::from(request.client);
    tracing::debug!(activity_id = ?request.id, "Direct update");
    let outcome = state
        .schedule
        .update_activity(request.id, request.updates, &ctx)
        .await;
    operation_response(outcome)
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<DeleteActivityRequest>,
) -> Result<Json<OperationResult>> {
    let ctx = RequestContext::from(request.client);
    tracing::debug!(activity_id = ?request.id, "Direct delete");
    let outcome = state.schedule.delete_activity(request.id, &ctx).await;
    operation_response(outcome)
}

async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<Activity>>> {
    let ctx = RequestContext {
        user_id: query.user_id,
        ..Default::default()
    };
    let activities = state.schedule.get_schedule(&ctx).await.map_err(AppError::from)?;
    Ok(Json(activities))
}
