// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Each user's schedule is a single document. Writes are compare-and-swap on
//! the document's `version`, so concurrent requests for the same user cannot
//! silently overwrite each other.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryScheduleStore;

use crate::error::AppError;
use crate::models::{Activity, VersionedSchedule};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// One schedule document per user id
    pub const SCHEDULES: &str = "schedules";
}

/// Key-value schedule storage keyed by user id.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Whether the store is connected. Operations refuse to run otherwise.
    fn is_ready(&self) -> bool;

    /// Read a user's schedule. A missing document is an empty schedule at version 0.
    async fn load_schedule(&self, user_id: &str) -> Result<VersionedSchedule, AppError>;

    /// Replace a user's schedule if it is still at `expected_version`.
    ///
    /// Returns the new version, or [`AppError::Conflict`] if another write
    /// got there first.
    async fn save_schedule(
        &self,
        user_id: &str,
        activities: &[Activity],
        expected_version: u64,
    ) -> Result<u64, AppError>;
}
