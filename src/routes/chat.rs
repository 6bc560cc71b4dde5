// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat endpoint: one message in, one reply out.

use super::JsonBody;
use crate::error::{AppError, Result};
use crate::services::{dispatch, ChatReply, RequestContext};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat", post(chat))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Json<ChatReply>> {
    let missing = || AppError::BadRequest("message and userId required".to_string());
    request.validate().map_err(|_| missing())?;
    let (Some(message), Some(user_id)) = (request.message, request.user_id) else {
        return Err(missing());
    };

    let guess = state.oracle.extract_intent(&message).await;
    tracing::info!(
        user_id = %user_id,
        intent = ?guess.intent,
        confidence = guess.confidence,
        time_zone = ?request.time_zone,
        "Intent extracted"
    );

    let ctx = RequestContext {
        user_id: Some(user_id),
        access_token: request.access_token,
        time_zone: request.time_zone,
    };

    Ok(Json(dispatch(&state.schedule, guess, &ctx).await))
}
