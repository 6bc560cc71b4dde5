// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map the oracle's loosely-named argument fields onto canonical fields.
//!
//! Each canonical field has an ordered list of accepted names. The first
//! name with a non-empty value wins.

use crate::models::activity::{string_list as as_list, text_value as as_text};
use serde_json::{Map, Value};

const TITLE: &[&str] = &["title", "activity", "task", "event"];
const START_TIME: &[&str] = &["startTime", "time", "at", "start"];
const END_TIME: &[&str] = &["endTime", "end"];
const DURATION: &[&str] = &["duration"];
const DESCRIPTION: &[&str] = &["description", "desc"];
const LOCATION: &[&str] = &["location"];
const ID: &[&str] = &["id"];
const QUERY: &[&str] = &["query"];
const TAGS: &[&str] = &["tags"];
const DAYS: &[&str] = &["days", "recurrence", "on"];
const ATTENDEES: &[&str] = &["attendees", "guests"];

/// Arguments after aliasing. Absent means no accepted name had a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityArgs {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub id: Option<u64>,
    pub query: Option<String>,
    pub tags: Option<Vec<String>>,
    pub days: Option<Vec<String>>,
    pub attendees: Option<Vec<String>>,
}

/// Resolve canonical fields from a raw argument object.
///
/// Anything other than a JSON object yields all-absent arguments.
pub fn alias_arguments(raw: &Value) -> ActivityArgs {
    let Some(map) = raw.as_object() else {
        return ActivityArgs::default();
    };

    ActivityArgs {
        title: first_text(map, TITLE),
        start_time: first_text(map, START_TIME),
        end_time: first_text(map, END_TIME),
        duration: first_text(map, DURATION),
        description: first_text(map, DESCRIPTION),
        location: first_text(map, LOCATION),
        id: first_value(map, ID).and_then(as_id),
        query: first_text(map, QUERY),
        tags: first_value(map, TAGS).and_then(as_list),
        days: first_value(map, DAYS).and_then(as_list),
        attendees: first_value(map, ATTENDEES).and_then(as_list),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn first_value<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| map.get(*name))
        .find(|value| !is_empty(value))
}

fn first_text(map: &Map<String, Value>, names: &[&str]) -> Option<String> {
    first_value(map, names).and_then(as_text)
}

fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
