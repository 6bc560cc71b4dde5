// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Chat-Scheduler: manage a daily schedule by talking to it
//!
//! This crate provides the backend API that turns chat messages into
//! schedule changes, stores them per user, and mirrors them to Google
//! Calendar.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{IntentOracle, ScheduleService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub schedule: ScheduleService,
    pub oracle: Arc<dyn IntentOracle>,
}
