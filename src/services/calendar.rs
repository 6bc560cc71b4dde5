// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar API client for mirroring schedule changes.
//!
//! Handles:
//! - Event insert/patch/delete on the user's primary calendar
//! - Building event bodies from activities (local times + timezone name)
//! - Weekly recurrence rules from weekday names

use crate::error::AppError;
use anyhow::Context;
use crate::models::{Activity, ActivityUpdates};
use crate::time_utils::to_local_iso;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Event body sent to the calendar. Absent fields are omitted, which makes
/// the same type usable for full inserts and partial patches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EventAttendee>>,
}

/// Local date-time plus the IANA zone the calendar should resolve it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAttendee {
    pub email: String,
}

/// Identifiers of a newly created calendar event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Remote calendar operations. All calls are best-effort from the
/// schedule's point of view.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<InsertedEvent, AppError>;

    async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        patch: &CalendarEvent,
    ) -> Result<(), AppError>;

    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), AppError>;
}

/// Google Calendar v3 client for the `primary` calendar.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed building Calendar HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.base_url)
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), event_id)
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(self.response_error(response).await)
    }

    async fn response_error(&self, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Expired or revoked access token
        if status.as_u16() == 401 {
            return AppError::CalendarApi(format!(
                "{} (HTTP 401)",
                AppError::CALENDAR_TOKEN_ERROR
            ));
        }

        AppError::CalendarApi(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<InsertedEvent, AppError> {
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.response_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::CalendarApi(format!("JSON parse error: {}", e)))
    }

    async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        patch: &CalendarEvent,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .patch(self.event_url(event_id))
            .bearer_auth(access_token)
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        self.check_response(response).await
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.event_url(event_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::CalendarApi(e.to_string()))?;

        self.check_response(response).await
    }
}

/// Two-letter RRULE code for an English weekday name.
fn weekday_code(day: &str) -> Option<&'static str> {
    match day.trim().to_ascii_lowercase().as_str() {
        "monday" => Some("MO"),
        "tuesday" => Some("TU"),
        "wednesday" => Some("WE"),
        "thursday" => Some("TH"),
        "friday" => Some("FR"),
        "saturday" => Some("SA"),
        "sunday" => Some("SU"),
        _ => None,
    }
}

/// Build a weekly recurrence rule from weekday names.
///
/// Unknown names are dropped; `None` when nothing is left. Always WEEKLY
/// with INTERVAL=1, even for all seven days, so the calendar shows a
/// repeating series rather than a plain daily event.
pub fn build_recurrence(days: &[String]) -> Option<Vec<String>> {
    let codes: Vec<&str> = days.iter().filter_map(|d| weekday_code(d)).collect();
    if codes.is_empty() {
        return None;
    }
    Some(vec![format!(
        "RRULE:FREQ=WEEKLY;INTERVAL=1;BYDAY={}",
        codes.join(",")
    )])
}

fn event_time(time: &str, tz: Tz, now: DateTime<Utc>) -> EventDateTime {
    EventDateTime {
        date_time: to_local_iso(Some(time), tz, now),
        time_zone: tz.name().to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Full event body for a new activity.
pub fn event_for_activity(activity: &Activity, tz: Tz, now: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        summary: Some(activity.title.clone()),
        location: non_empty(&activity.location),
        description: non_empty(&activity.description),
        start: Some(event_time(&activity.start_time, tz, now)),
        end: Some(event_time(&activity.end_time, tz, now)),
        recurrence: build_recurrence(&activity.days),
        attendees: Some(
            activity
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                })
                .collect(),
        ),
    }
}

/// Patch body carrying only the fields present in `updates`.
///
/// Times and days are taken from the merged record so the patch matches
/// what was stored.
pub fn patch_for_updates(
    updates: &ActivityUpdates,
    merged: &Activity,
    tz: Tz,
    now: DateTime<Utc>,
) -> CalendarEvent {
    CalendarEvent {
        summary: updates.title.clone().filter(|t| !t.is_empty()),
        description: updates.description.clone().filter(|d| !d.is_empty()),
        location: updates.location.clone().filter(|l| !l.is_empty()),
        start: updates
            .start_time
            .as_ref()
            .map(|_| event_time(&merged.start_time, tz, now)),
        end: updates
            .end_time
            .as_ref()
            .map(|_| event_time(&merged.end_time, tz, now)),
        recurrence: updates
            .days
            .as_ref()
            .and_then(|_| build_recurrence(&merged.days)),
        attendees: updates.attendees.as_ref().map(|emails| {
            emails
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                })
                .collect()
        }),
    }
}
