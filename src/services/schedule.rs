// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schedule operations.
//!
//! Every mutation follows the same workflow:
//! 1. Read the user's whole schedule
//! 2. Compute the change and validate the resulting record
//! 3. Mirror the change to Google Calendar (best-effort)
//! 4. Write the whole schedule back, re-applying the change on version conflicts
//!
//! The local schedule is the source of truth. A calendar failure never
//! blocks the write; it is reported next to the result as `calendarError`.

use crate::db::ScheduleStore;
use crate::error::{AppError, ScheduleError};
use crate::models::activity::DEFAULT_STATUS;
use crate::models::{next_activity_id, Activity, ActivityUpdates, NewActivity, VersionedSchedule};
use crate::services::calendar::{event_for_activity, patch_for_updates, CalendarClient, CalendarEvent};
use crate::services::normalize::{normalize_updates, validate_activity};
use crate::time_utils::{resolve_timezone, weekday_name};
use chrono::Utc;
use chrono_tz::Tz;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Attempts at a versioned write before giving up.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Who is asking, plus the optional calendar credential and timezone.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<String>,
    /// Google OAuth access token; calendar sync is skipped without it
    pub access_token: Option<String>,
    /// IANA timezone name, UTC when absent
    pub time_zone: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    fn user_id(&self) -> Result<&str, ScheduleError> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ScheduleError::Unauthenticated)
    }

    fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    fn timezone(&self) -> Tz {
        resolve_timezone(self.time_zone.as_deref())
    }
}

/// Outcome of the advisory calendar mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarSync {
    /// No credential, or no mirrored event to touch
    Skipped,
    Synced,
    Failed(String),
}

impl CalendarSync {
    fn from_result<T>(result: Result<T, AppError>, action: &str) -> (Self, Option<T>) {
        match result {
            Ok(value) => (CalendarSync::Synced, Some(value)),
            Err(e) => {
                if e.is_calendar_token_error() {
                    tracing::info!(action, "Calendar token rejected, client must re-authorize");
                } else {
                    tracing::warn!(error = %e, action, "Calendar sync failed");
                }
                (CalendarSync::Failed(e.to_string()), None)
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CalendarSync::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Result of one schedule operation, as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_error: Option<String>,
}

impl OperationResult {
    /// Merge a committed store mutation with its calendar outcome.
    fn committed(
        sync: &CalendarSync,
        synced_message: &str,
        partial_message: &str,
        activity: Option<Activity>,
    ) -> Self {
        let message = match sync {
            CalendarSync::Failed(_) => partial_message,
            _ => synced_message,
        };
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
            activity,
            calendar_error: sync.error().map(str::to_string),
        }
    }

    pub fn failure(err: &ScheduleError) -> Self {
        let text = Some(err.to_string());
        let (message, error) = if err.is_not_found() {
            (text, None)
        } else {
            (None, text)
        };
        Self {
            success: false,
            message,
            error,
            activity: None,
            calendar_error: None,
        }
    }

    /// Fold an operation error into a failed result.
    pub fn from_outcome(outcome: Result<OperationResult, ScheduleError>) -> Self {
        outcome.unwrap_or_else(|e| Self::failure(&e))
    }

    /// The user-facing reason for a failure.
    pub fn reason(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
    }
}

fn assign_id(activities: &[Activity]) -> Result<u64, ScheduleError> {
    next_activity_id(activities)
        .ok_or_else(|| ScheduleError::Validation("No activity ids left".to_string()))
}

/// Random display color, "#rrggbb".
fn random_color() -> String {
    format!("#{:06x}", rand::thread_rng().gen_range(0..=0xFF_FFFFu32))
}

/// Normalize `updates` against `existing` and merge them, provided the
/// result is still a valid activity.
fn merge_updates(
    existing: &Activity,
    updates: ActivityUpdates,
) -> Result<(ActivityUpdates, Activity), ScheduleError> {
    let updates = normalize_updates(updates, existing)?;
    let mut merged = existing.clone();
    merged.apply_updates(&updates);
    validate_activity(&merged)?;
    Ok((updates, merged))
}

/// Schedule operations over a store and a calendar mirror.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    calendar: Arc<dyn CalendarClient>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, calendar: Arc<dyn CalendarClient>) -> Self {
        Self { store, calendar }
    }

    /// Whether the backing store is connected.
    pub fn store_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// Authenticated user id, provided the store is usable.
    fn authorize<'a>(&self, ctx: &'a RequestContext) -> Result<&'a str, ScheduleError> {
        let user_id = ctx.user_id()?;
        if !self.store.is_ready() {
            return Err(ScheduleError::StoreUnavailable);
        }
        Ok(user_id)
    }

    /// Get a user's activities in stored order.
    pub async fn get_schedule(&self, ctx: &RequestContext) -> Result<Vec<Activity>, ScheduleError> {
        let user_id = self.authorize(ctx)?;
        let schedule = self.store.load_schedule(user_id).await?;
        tracing::debug!(user_id, count = schedule.activities.len(), "Fetched schedule");
        Ok(schedule.activities)
    }

    /// Add a normalized activity to the user's schedule.
    pub async fn add_activity(
        &self,
        draft: NewActivity,
        ctx: &RequestContext,
    ) -> Result<OperationResult, ScheduleError> {
        let user_id = self.authorize(ctx)?;
        let tz = ctx.timezone();
        let now = Utc::now();

        let schedule = self.store.load_schedule(user_id).await?;

        let mut activity = Activity {
            id: assign_id(&schedule.activities)?,
            title: draft.title,
            start_time: draft.start_time,
            end_time: draft.end_time,
            description: draft.description.unwrap_or_default(),
            location: draft.location.unwrap_or_default(),
            attendees: draft.attendees.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            days: draft
                .days
                .filter(|days| !days.is_empty())
                .unwrap_or_else(|| vec![weekday_name(tz, now)]),
            status: DEFAULT_STATUS.to_string(),
            color: random_color(),
            google_event_id: None,
            html_link: None,
        };
        validate_activity(&activity)?;

        let sync = match ctx.access_token() {
            Some(token) => {
                let event = event_for_activity(&activity, tz, now);
                let (sync, inserted) = CalendarSync::from_result(
                    self.calendar.insert_event(token, &event).await,
                    "insert",
                );
                if let Some(inserted) = inserted {
                    tracing::info!(user_id, event_id = %inserted.id, "Calendar event created");
                    activity.google_event_id = Some(inserted.id);
                    activity.html_link = inserted.html_link;
                }
                sync
            }
            None => CalendarSync::Skipped,
        };

        let stored = self
            .commit(user_id, schedule, |activities| {
                let mut new_activity = activity.clone();
                new_activity.id = assign_id(activities)?;
                activities.push(new_activity.clone());
                Ok(new_activity)
            })
            .await?;

        tracing::info!(user_id, activity_id = stored.id, title = %stored.title, "Activity added");

        Ok(OperationResult::committed(
            &sync,
            "Activity added and synced.",
            "Activity added to DB, but Calendar sync failed.",
            Some(stored),
        ))
    }

    /// Shallow-merge `updates` into the activity with `id`.
    pub async fn update_activity(
        &self,
        id: Option<u64>,
        updates: ActivityUpdates,
        ctx: &RequestContext,
    ) -> Result<OperationResult, ScheduleError> {
        let user_id = self.authorize(ctx)?;
        let id = id.ok_or_else(|| ScheduleError::Validation("Activity id is required".to_string()))?;
        let tz = ctx.timezone();
        let now = Utc::now();

        let schedule = self.store.load_schedule(user_id).await?;
        let existing = schedule
            .activities
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ScheduleError::ActivityNotFound)?;

        let (normalized, merged) = merge_updates(&existing, updates.clone())?;

        let sync = match (ctx.access_token(), existing.google_event_id.as_deref()) {
            (Some(token), Some(event_id)) => {
                let patch = patch_for_updates(&normalized, &merged, tz, now);
                if patch == CalendarEvent::default() {
                    CalendarSync::Skipped
                } else {
                    let (sync, _) = CalendarSync::from_result(
                        self.calendar.patch_event(token, event_id, &patch).await,
                        "patch",
                    );
                    sync
                }
            }
            _ => CalendarSync::Skipped,
        };

        // Durations resolve against the start time of the fresh record
        let updated = self
            .commit(user_id, schedule, |activities| {
                let entry = activities
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(ScheduleError::ActivityNotFound)?;
                let (_, merged) = merge_updates(entry, updates.clone())?;
                *entry = merged;
                Ok(entry.clone())
            })
            .await?;

        tracing::info!(user_id, activity_id = id, "Activity updated");

        Ok(OperationResult::committed(
            &sync,
            "Activity updated.",
            "Updated in DB, but Calendar update failed.",
            Some(updated),
        ))
    }

    /// Remove the activity with `id`.
    pub async fn delete_activity(
        &self,
        id: Option<u64>,
        ctx: &RequestContext,
    ) -> Result<OperationResult, ScheduleError> {
        let user_id = self.authorize(ctx)?;
        let id = id.ok_or_else(|| ScheduleError::Validation("Activity id is required".to_string()))?;

        let schedule = self.store.load_schedule(user_id).await?;
        let existing = schedule
            .activities
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ScheduleError::ActivityNotFound)?;

        let sync = match (ctx.access_token(), existing.google_event_id.as_deref()) {
            (Some(token), Some(event_id)) => {
                let (sync, _) = CalendarSync::from_result(
                    self.calendar.delete_event(token, event_id).await,
                    "delete",
                );
                sync
            }
            _ => CalendarSync::Skipped,
        };

        self.commit(user_id, schedule, |activities| {
            activities.retain(|a| a.id != id);
            Ok(())
        })
        .await?;

        tracing::info!(user_id, activity_id = id, "Activity deleted");

        Ok(OperationResult::committed(
            &sync,
            "Activity deleted.",
            "Deleted from DB, but Calendar deletion failed.",
            None,
        ))
    }

    /// Apply `change` to the schedule and write it back.
    ///
    /// On a version conflict the schedule is re-read and `change` applied
    /// again to the fresh copy. Calendar calls happen before this and are
    /// never repeated.
    async fn commit<T, F>(
        &self,
        user_id: &str,
        mut schedule: VersionedSchedule,
        mut change: F,
    ) -> Result<T, ScheduleError>
    where
        F: FnMut(&mut Vec<Activity>) -> Result<T, ScheduleError>,
    {
        let mut attempt = 1;
        loop {
            let value = change(&mut schedule.activities)?;

            match self
                .store
                .save_schedule(user_id, &schedule.activities, schedule.version)
                .await
            {
                Ok(_) => return Ok(value),
                Err(AppError::Conflict) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(user_id, attempt, "Schedule write conflict, retrying");
                    attempt += 1;
                    schedule = self.store.load_schedule(user_id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
