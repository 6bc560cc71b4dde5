// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Schedule activity model for storage and API.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Default lifecycle label for new activities.
pub const DEFAULT_STATUS: &str = "Pending";

/// Stored schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Per-user id, assigned as max(existing) + 1
    #[serde(deserialize_with = "id_from_number_or_string")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub title: String,
    /// Canonical "HH:MM"
    pub start_time: String,
    /// Canonical "HH:MM"
    pub end_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Weekday names the activity repeats on
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Display color ("#rrggbb"), fixed at creation
    #[serde(default)]
    pub color: String,
    /// Mirrored Google Calendar event, if sync succeeded at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Ids arrive as numbers, or as numeric strings in older documents and
/// some clients.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_id<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.into_id()
}

/// Optional id in a request body; `null` and absent both mean no id.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_id)
        .transpose()
}

/// Scalar JSON as text; numbers and booleans are stringified.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept an array of strings or one comma-separated string.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(text_value)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

fn optional_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => string_list(&value).map(Some).ok_or_else(|| {
            D::Error::custom("expected a list of strings or a comma-separated string")
        }),
    }
}

impl Activity {
    /// Shallow-merge the fields present in `updates` over this record.
    pub fn apply_updates(&mut self, updates: &ActivityUpdates) {
        if let Some(title) = &updates.title {
            self.title = title.clone();
        }
        if let Some(start_time) = &updates.start_time {
            self.start_time = start_time.clone();
        }
        if let Some(end_time) = &updates.end_time {
            self.end_time = end_time.clone();
        }
        if let Some(description) = &updates.description {
            self.description = description.clone();
        }
        if let Some(location) = &updates.location {
            self.location = location.clone();
        }
        if let Some(attendees) = &updates.attendees {
            self.attendees = attendees.clone();
        }
        if let Some(tags) = &updates.tags {
            self.tags = tags.clone();
        }
        if let Some(days) = &updates.days {
            self.days = days.clone();
        }
        if let Some(status) = &updates.status {
            self.status = status.clone();
        }
    }
}

/// A normalized request to create an activity.
///
/// Produced by the normalizer: `start_time` and `end_time` are always set,
/// canonical unless the input could not be parsed at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub days: Option<Vec<String>>,
}

/// Partial update for an existing activity. Absent fields are left alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdates {
    pub title: Option<String>,
    #[serde(alias = "time", alias = "start")]
    pub start_time: Option<String>,
    #[serde(alias = "end")]
    pub end_time: Option<String>,
    /// Used to derive `end_time` when no end time is given
    pub duration: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "optional_list")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_list")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_list")]
    pub days: Option<Vec<String>>,
    pub status: Option<String>,
}
