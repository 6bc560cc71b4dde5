// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod intent;
pub mod schedule;

pub use activity::{Activity, ActivityUpdates, NewActivity};
pub use intent::{Intent, IntentGuess};
pub use schedule::{next_activity_id, ScheduleDocument, StoredActivities, VersionedSchedule};
