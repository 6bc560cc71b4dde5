// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chat_scheduler::config::Config;
use chat_scheduler::db::{FirestoreDb, MemoryScheduleStore, ScheduleStore};
use chat_scheduler::error::AppError;
use chat_scheduler::models::{Activity, IntentGuess};
use chat_scheduler::routes::create_router;
use chat_scheduler::services::calendar::{CalendarClient, CalendarEvent, InsertedEvent};
use chat_scheduler::services::{IntentOracle, RequestContext, ScheduleService};
use chat_scheduler::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique user id for test isolation.
#[allow(dead_code)]
pub fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

/// A calendar call seen by [`FakeCalendar`].
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarCall {
    Insert(CalendarEvent),
    Patch(String, CalendarEvent),
    Delete(String),
}

/// Calendar double that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeCalendar {
    calls: Mutex<Vec<CalendarCall>>,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl FakeCalendar {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<CalendarCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: CalendarCall) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::CalendarApi("HTTP 500: backend error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarClient for FakeCalendar {
    async fn insert_event(
        &self,
        _access_token: &str,
        event: &CalendarEvent,
    ) -> Result<InsertedEvent, AppError> {
        self.record(CalendarCall::Insert(event.clone()))?;
        let n = self.calls.lock().unwrap().len();
        Ok(InsertedEvent {
            id: format!("evt-{}", n),
            html_link: Some(format!("https://calendar.example.com/evt-{}", n)),
        })
    }

    async fn patch_event(
        &self,
        _access_token: &str,
        event_id: &str,
        patch: &CalendarEvent,
    ) -> Result<(), AppError> {
        self.record(CalendarCall::Patch(event_id.to_string(), patch.clone()))
    }

    async fn delete_event(&self, _access_token: &str, event_id: &str) -> Result<(), AppError> {
        self.record(CalendarCall::Delete(event_id.to_string()))
    }
}

/// Oracle double that answers every message with the same guess.
pub struct ScriptedOracle {
    guess: Mutex<IntentGuess>,
    messages: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedOracle {
    pub fn new(guess: IntentGuess) -> Self {
        Self {
            guess: Mutex::new(guess),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(&self, guess: IntentGuess) {
        *self.guess.lock().unwrap() = guess;
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentOracle for ScriptedOracle {
    async fn extract_intent(&self, message: &str) -> IntentGuess {
        self.messages.lock().unwrap().push(message.to_string());
        self.guess.lock().unwrap().clone()
    }
}

/// Build an intent guess from JSON-ish parts.
#[allow(dead_code)]
pub fn guess(intent: &str, arguments: serde_json::Value, confidence: f64) -> IntentGuess {
    IntentGuess {
        intent: Some(intent.to_string()),
        arguments,
        confidence,
    }
}

/// A stored activity for seeding schedules.
#[allow(dead_code)]
pub fn activity(id: u64, title: &str, start: &str, end: &str) -> Activity {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "startTime": start,
        "endTime": end,
        "days": ["Monday"],
        "color": "#123456"
    }))
    .unwrap()
}

/// Request context for `user_id` with a calendar token and fixed timezone.
#[allow(dead_code)]
pub fn ctx_with_token(user_id: &str) -> RequestContext {
    RequestContext {
        user_id: Some(user_id.to_string()),
        access_token: Some("test-token".to_string()),
        time_zone: Some("America/Los_Angeles".to_string()),
    }
}

/// Offline test fixture: in-memory store, fake calendar, scripted oracle.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryScheduleStore,
    pub calendar: Arc<FakeCalendar>,
    pub oracle: Arc<ScriptedOracle>,
}

/// Schedule service over the given store and a fresh fake calendar.
#[allow(dead_code)]
pub fn test_service(store: Arc<dyn ScheduleStore>) -> (ScheduleService, Arc<FakeCalendar>) {
    let calendar = Arc::new(FakeCalendar::default());
    (ScheduleService::new(store, calendar.clone()), calendar)
}

/// Create a test app with offline dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let store = MemoryScheduleStore::new();
    let calendar = Arc::new(FakeCalendar::default());
    let oracle = Arc::new(ScriptedOracle::new(IntentGuess::none()));

    let state = Arc::new(AppState {
        config: Config::test_default(),
        schedule: ScheduleService::new(Arc::new(store.clone()), calendar.clone()),
        oracle: oracle.clone(),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        calendar,
        oracle,
    }
}

/// Create a test app whose store is not connected.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let calendar = Arc::new(FakeCalendar::default());
    let state = Arc::new(AppState {
        config: Config::test_default(),
        schedule: ScheduleService::new(Arc::new(FirestoreDb::new_mock()), calendar),
        oracle: Arc::new(ScriptedOracle::new(IntentGuess::none())),
    });
    (create_router(state.clone()), state)
}
