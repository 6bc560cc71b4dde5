// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intent guesses returned by the language-model oracle.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions the assistant knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    GetSchedule,
    AddActivity,
    UpdateActivity,
    DeleteActivity,
    FindHackathons,
}

impl Intent {
    /// Map an oracle intent name to a supported intent.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getSchedule" => Some(Intent::GetSchedule),
            "addActivity" => Some(Intent::AddActivity),
            "updateActivity" => Some(Intent::UpdateActivity),
            "deleteActivity" => Some(Intent::DeleteActivity),
            "findHackathons" => Some(Intent::FindHackathons),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::GetSchedule => "getSchedule",
            Intent::AddActivity => "addActivity",
            Intent::UpdateActivity => "updateActivity",
            Intent::DeleteActivity => "deleteActivity",
            Intent::FindHackathons => "findHackathons",
        }
    }
}

/// Raw oracle output. Never persisted.
///
/// `intent` stays a string so unsupported names can be told apart from a
/// missing intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentGuess {
    #[serde(default)]
    pub intent: Option<String>,
    /// A single field map, or an array of them for multi-add messages
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
    #[serde(default)]
    pub confidence: f64,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

impl IntentGuess {
    /// The "no confident intent" outcome.
    pub fn none() -> Self {
        Self {
            intent: None,
            arguments: empty_arguments(),
            confidence: 0.0,
        }
    }

    /// Intent name with the explicit "none" label folded into `None`.
    pub fn intent_name(&self) -> Option<&str> {
        match self.intent.as_deref().map(str::trim) {
            None | Some("") | Some("none") | Some("null") => None,
            Some(name) => Some(name),
        }
    }
}
