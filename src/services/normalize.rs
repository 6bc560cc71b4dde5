// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turn aliased chat arguments into well-formed activity records.
//!
//! End time resolution, in priority order:
//! 1. `duration` added to the start, when no `endTime` is given and both parse
//! 2. an explicit `endTime`
//! 3. one hour after the start
//!
//! If none applies the request is rejected.

use crate::error::ScheduleError;
use crate::models::{Activity, ActivityUpdates, NewActivity};
use crate::services::aliases::ActivityArgs;
use crate::time_utils::{
    add_minutes, canonicalize_time, format_time, is_canonical_time, parse_duration_minutes,
    parse_time, DEFAULT_ACTIVITY_MINUTES,
};

/// Normalize arguments for a new activity.
pub fn normalize_new_activity(args: ActivityArgs) -> Result<NewActivity, ScheduleError> {
    let (title, start_raw) = match (args.title, args.start_time) {
        (Some(title), Some(start)) => (title, start),
        (title, start) => {
            let missing = match (&title, &start) {
                (None, None) => "title and startTime",
                (None, Some(_)) => "title",
                _ => "startTime",
            };
            return Err(ScheduleError::Validation(format!(
                "Missing {} for task: {}",
                missing,
                title.as_deref().unwrap_or("Unknown")
            )));
        }
    };

    let parsed_start = parse_time(&start_raw);
    let start_time = parsed_start
        .as_ref()
        .map(format_time)
        .unwrap_or_else(|| start_raw.clone());

    let from_duration = match (&args.end_time, &args.duration, &parsed_start) {
        (None, Some(duration), Some(start)) => {
            parse_duration_minutes(duration).and_then(|minutes| add_minutes(start, minutes))
        }
        _ => None,
    };

    let end_time = if let Some(end) = from_duration {
        format_time(&end)
    } else if let Some(end) = &args.end_time {
        canonicalize_time(end)
    } else if let Some(end) = parsed_start
        .as_ref()
        .and_then(|start| add_minutes(start, DEFAULT_ACTIVITY_MINUTES))
    {
        format_time(&end)
    } else {
        return Err(ScheduleError::Validation(format!(
            "Could not calculate end time for {}",
            title
        )));
    };

    Ok(NewActivity {
        title,
        start_time,
        end_time,
        description: args.description,
        location: args.location,
        attendees: args.attendees,
        tags: args.tags,
        days: args.days,
    })
}

/// Convert aliased chat arguments into a partial update.
pub fn updates_from_args(args: ActivityArgs) -> ActivityUpdates {
    ActivityUpdates {
        title: args.title,
        start_time: args.start_time,
        end_time: args.end_time,
        duration: args.duration,
        description: args.description,
        location: args.location,
        attendees: args.attendees,
        tags: args.tags,
        days: args.days,
        status: None,
    }
}

/// Canonicalize the times in an update against the record it applies to.
///
/// A `duration` without an `endTime` sets the end relative to the new (or
/// existing) start time.
pub fn normalize_updates(
    mut updates: ActivityUpdates,
    existing: &Activity,
) -> Result<ActivityUpdates, ScheduleError> {
    if updates.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ScheduleError::Validation(
            "Title cannot be empty".to_string(),
        ));
    }

    updates.start_time = updates.start_time.as_deref().map(canonicalize_time);
    updates.end_time = updates.end_time.as_deref().map(canonicalize_time);

    if updates.end_time.is_none() {
        if let Some(minutes) = updates.duration.as_deref().and_then(parse_duration_minutes) {
            let start = updates
                .start_time
                .as_deref()
                .unwrap_or(existing.start_time.as_str());
            updates.end_time = parse_time(start)
                .and_then(|s| add_minutes(&s, minutes))
                .map(|end| format_time(&end));
        }
    }

    Ok(updates)
}

/// Check the invariants every stored activity must satisfy.
pub fn validate_activity(activity: &Activity) -> Result<(), ScheduleError> {
    if activity.title.trim().is_empty() {
        return Err(ScheduleError::Validation(
            "Title cannot be empty".to_string(),
        ));
    }
    if !is_canonical_time(&activity.start_time) {
        return Err(ScheduleError::Validation(format!(
            "Invalid startTime '{}' for {}",
            activity.start_time, activity.title
        )));
    }
    if !is_canonical_time(&activity.end_time) {
        return Err(ScheduleError::Validation(format!(
            "Invalid endTime '{}' for {}",
            activity.end_time, activity.title
        )));
    }
    Ok(())
}
