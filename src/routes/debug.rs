// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Configuration status for troubleshooting deployments.

use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/debug", get(debug_status))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStatus {
    /// An oracle credential is present
    pub oracle_configured: bool,
    /// "Connected" or "Not Configured"
    pub store: String,
    pub version: String,
}

async fn debug_status(State(state): State<Arc<AppState>>) -> Json<DebugStatus> {
    let store = if state.schedule.store_ready() {
        "Connected"
    } else {
        "Not Configured"
    };

    Json(DebugStatus {
        oracle_configured: state.oracle.is_configured(),
        store: store.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
