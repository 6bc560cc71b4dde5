// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intent dispatch tests: oracle guess in, chat reply out.

use chat_scheduler::db::{MemoryScheduleStore, ScheduleStore};
use chat_scheduler::models::{IntentGuess, ScheduleDocument, StoredActivities};
use chat_scheduler::services::dispatch::{UNSUPPORTED_REPLY, UNSURE_REPLY};
use chat_scheduler::services::{dispatch, ChatResult, RequestContext};
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{activity, guess, test_service};

const USER: &str = "chat-user";

fn ctx() -> RequestContext {
    RequestContext {
        user_id: Some(USER.to_string()),
        access_token: None,
        time_zone: Some("Europe/Berlin".to_string()),
    }
}

#[tokio::test]
async fn test_low_confidence_does_not_mutate() {
    let store = MemoryScheduleStore::new();
    let (service, _) = test_service(Arc::new(store.clone()));

    let reply = dispatch(
        &service,
        guess("addActivity", json!({"title": "Gym", "time": "6pm"}), 0.59),
        &ctx(),
    )
    .await;

    assert_eq!(reply.reply, UNSURE_REPLY);
    assert!(!reply.refresh_needed);
    assert!(reply.result.is_none());
    assert_eq!(store.version(USER), 0);
}

#[tokio::test]
async fn test_null_intent_is_unsure() {
    let (service, _) = test_service(Arc::new(MemoryScheduleStore::new()));

    let reply = dispatch(&service, IntentGuess::none(), &ctx()).await;
    assert_eq!(reply.reply, "I'm not sure what you want to do.");

    let nan = guess("getSchedule", json!({}), f64::NAN);
    assert_eq!(dispatch(&service, nan, &ctx()).await.reply, UNSURE_REPLY);
}

#[tokio::test]
async fn test_unknown_intent_is_unsupported() {
    let (service, _) = test_service(Arc::new(MemoryScheduleStore::new()));

    let reply = dispatch(&service, guess("bookFlight", json!({}), 0.95), &ctx()).await;
    assert_eq!(reply.reply, UNSUPPORTED_REPLY);
    assert!(!reply.refresh_needed);
}

#[tokio::test]
async fn test_single_add_with_aliases() {
    let store = MemoryScheduleStore::new();
    let (service, _) = test_service(Arc::new(store.clone()));

    let reply = dispatch(
        &service,
        guess(
            "addActivity",
            json!({"task": "Swim", "at": "5am", "duration": "30 mins", "on": ["Tuesday"]}),
            0.9,
        ),
        &ctx(),
    )
    .await;

    assert_eq!(reply.reply, "Done! Added the activity.");
    assert!(reply.refresh_needed);

    let activities = store.load_schedule(USER).await.unwrap().activities;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].title, "Swim");
    assert_eq!(activities[0].start_time, "05:00");
    assert_eq!(activities[0].end_time, "05:30");
    assert_eq!(activities[0].days, vec!["Tuesday".to_string()]);
}

#[tokio::test]
async fn test_multi_add_all_succeed() {
    let store = MemoryScheduleStore::new();
    let (service, _) = test_service(Arc::new(store.clone()));

    let reply = dispatch(
        &service,
        guess(
            "addActivity",
            json!([
                {"title": "Swim", "time": "10pm"},
                {"title": "Read", "time": "8am", "tags": ["study"]}
            ]),
            0.8,
        ),
        &ctx(),
    )
    .await;

    assert_eq!(reply.reply, "Done! I've added all your tasks.");
    let ids: Vec<u64> = store
        .load_schedule(USER)
        .await
        .unwrap()
        .activities
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_partial_batch_continues_after_failure() {
    let store = MemoryScheduleStore::new();
    let (service, _) = test_service(Arc::new(store.clone()));

    let reply = dispatch(
        &service,
        guess(
            "addActivity",
            json!([
                {"title": "Swim", "time": "10pm"},
                {"time": "9am"},
                {"title": "Read", "time": "8am"}
            ]),
            0.8,
        ),
        &ctx(),
    )
    .await;

    assert_eq!(
        reply.reply,
        "Partially successful. Added 2 tasks, but 1 failed."
    );
    assert!(reply.refresh_needed);

    let Some(ChatResult::Batch(batch)) = reply.result else {
        panic!("expected batch result");
    };
    assert_eq!(batch.message, "Processed 3 requests.");
    assert!(!batch.details[1].success);
    assert_eq!(
        batch.details[1].error.as_deref(),
        Some("Missing title for task: Unknown")
    );
    assert_eq!(store.load_schedule(USER).await.unwrap().activities.len(), 2);
}

#[tokio::test]
async fn test_all_failed_reports_first_error() {
    let (service, _) = test_service(Arc::new(MemoryScheduleStore::new()));

    let reply = dispatch(
        &service,
        guess("addActivity", json!({"title": "Lunch", "time": "noon"}), 0.9),
        &ctx(),
    )
    .await;

    assert_eq!(
        reply.reply,
        "I couldn't add that. Error: Could not calculate end time for Lunch"
    );
    assert!(!reply.refresh_needed);
}

#[tokio::test]
async fn test_update_and_delete_replies() {
    let store = MemoryScheduleStore::new();
    store.insert_document(
        USER,
        ScheduleDocument {
            activities: StoredActivities::List(vec![activity(4, "Walk", "07:00", "08:00")]),
            version: 1,
            updated_at: String::new(),
        },
    );
    let (service, _) = test_service(Arc::new(store.clone()));

    let reply = dispatch(
        &service,
        guess("updateActivity", json!({"id": "4", "time": "7:30am"}), 0.9),
        &ctx(),
    )
    .await;
    assert_eq!(reply.reply, "Updated! ✅");
    assert!(reply.refresh_needed);
    assert_eq!(
        store.load_schedule(USER).await.unwrap().activities[0].start_time,
        "07:30"
    );

    let reply = dispatch(
        &service,
        guess("deleteActivity", json!({"id": 99}), 0.9),
        &ctx(),
    )
    .await;
    assert_eq!(reply.reply, "Failed to delete: Activity not found.");
    assert!(!reply.refresh_needed);

    let reply = dispatch(
        &service,
        guess("deleteActivity", json!({"id": 4}), 0.9),
        &ctx(),
    )
    .await;
    assert_eq!(reply.reply, "Deleted! 🗑️");
    assert!(store.load_schedule(USER).await.unwrap().activities.is_empty());
}

#[tokio::test]
async fn test_get_schedule_and_hackathons() {
    let store = MemoryScheduleStore::new();
    let (service, _) = test_service(Arc::new(store));

    let reply = dispatch(&service, guess("getSchedule", json!({}), 0.7), &ctx()).await;
    assert_eq!(reply.result, Some(ChatResult::Schedule(vec![])));
    assert!(!reply.refresh_needed);

    let reply = dispatch(
        &service,
        guess("findHackathons", json!({"query": "climate"}), 0.7),
        &ctx(),
    )
    .await;
    let Some(ChatResult::Hackathons(found)) = reply.result else {
        panic!("expected hackathon results");
    };
    assert_eq!(found.message, "Found hackathons for query: \"climate\"");
    assert_eq!(found.results.len(), 3);
}
