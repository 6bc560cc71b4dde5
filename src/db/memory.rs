// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process schedule store for local runs and tests.

use super::ScheduleStore;
use crate::error::AppError;
use crate::models::{Activity, ScheduleDocument, StoredActivities, VersionedSchedule};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Schedule store backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryScheduleStore {
    docs: Arc<DashMap<String, ScheduleDocument>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, e.g. a map-shaped schedule from an older client.
    pub fn insert_document(&self, user_id: &str, doc: ScheduleDocument) {
        self.docs.insert(user_id.to_string(), doc);
    }

    /// Current document version for a user (0 if absent).
    pub fn version(&self, user_id: &str) -> u64 {
        self.docs.get(user_id).map(|d| d.version).unwrap_or(0)
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    fn is_ready(&self) -> bool {
        true
    }

    async fn load_schedule(&self, user_id: &str) -> Result<VersionedSchedule, AppError> {
        Ok(self
            .docs
            .get(user_id)
            .map(|doc| VersionedSchedule::from(doc.clone()))
            .unwrap_or_default())
    }

    async fn save_schedule(
        &self,
        user_id: &str,
        activities: &[Activity],
        expected_version: u64,
    ) -> Result<u64, AppError> {
        // The entry guard holds the shard lock, making check-and-write atomic.
        let mut entry = self.docs.entry(user_id.to_string()).or_default();
        if entry.version != expected_version {
            return Err(AppError::Conflict);
        }

        let version = expected_version + 1;
        *entry = ScheduleDocument {
            activities: StoredActivities::List(activities.to_vec()),
            version,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        Ok(version)
    }
}
