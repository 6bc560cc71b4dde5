// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user schedule document.

use super::Activity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Activities as found in storage: an ordered list, or a map keyed by
/// position/id (written by older clients).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredActivities {
    List(Vec<Activity>),
    Map(BTreeMap<String, Activity>),
}

impl Default for StoredActivities {
    fn default() -> Self {
        StoredActivities::List(Vec::new())
    }
}

impl StoredActivities {
    /// Normalize either storage shape into an ordered list.
    ///
    /// Map entries are ordered by numeric key when keys are numbers.
    pub fn into_list(self) -> Vec<Activity> {
        match self {
            StoredActivities::List(list) => list,
            StoredActivities::Map(map) => {
                let mut entries: Vec<(String, Activity)> = map.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => a.cmp(b),
                });
                entries.into_iter().map(|(_, activity)| activity).collect()
            }
        }
    }
}

/// Schedule document stored per user id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    #[serde(default)]
    pub activities: StoredActivities,
    /// Bumped on every write; used for compare-and-swap
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub updated_at: String,
}

/// A schedule as read from the store, with the version it was read at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionedSchedule {
    pub activities: Vec<Activity>,
    /// 0 when the user has no document yet
    pub version: u64,
}

impl From<ScheduleDocument> for VersionedSchedule {
    fn from(doc: ScheduleDocument) -> Self {
        Self {
            activities: doc.activities.into_list(),
            version: doc.version,
        }
    }
}

/// Next id for a schedule: max(existing) + 1, or 1 when empty.
///
/// None when the largest stored id is already `u64::MAX`.
pub fn next_activity_id(activities: &[Activity]) -> Option<u64> {
    activities.iter().map(|a| a.id).max().unwrap_or(0).checked_add(1)
}
