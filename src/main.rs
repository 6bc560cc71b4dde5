// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat-Scheduler API Server
//!
//! Turns chat messages into schedule changes and mirrors them to
//! Google Calendar.

use chat_scheduler::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryScheduleStore, ScheduleStore},
    services::{GeminiOracle, GoogleCalendarClient, IntentOracle, ScheduleService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Chat-Scheduler API");

    let store = init_store(&config).await;

    let calendar = Arc::new(
        GoogleCalendarClient::new(&config.calendar_api_url).expect("Failed to build calendar client"),
    );
    let schedule = ScheduleService::new(store, calendar);

    let oracle: Arc<dyn IntentOracle> = Arc::new(
        GeminiOracle::new(config.gemini_api_key.clone(), &config.gemini_model)
            .expect("Failed to build intent oracle"),
    );
    if !oracle.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set; chat messages will not be understood");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        schedule,
        oracle,
    });

    // Build router
    let app = chat_scheduler::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Pick the schedule store.
///
/// A Firestore connection failure does not stop the server; schedule
/// operations report the database as not initialized instead.
async fn init_store(config: &Config) -> Arc<dyn ScheduleStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory schedule store");
            Arc::new(MemoryScheduleStore::new())
        }
        StoreBackend::Firestore => match FirestoreDb::new(&config.gcp_project_id).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                tracing::error!(error = %e, "Firestore unavailable, running without a database");
                Arc::new(FirestoreDb::new_mock())
            }
        },
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_scheduler=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
