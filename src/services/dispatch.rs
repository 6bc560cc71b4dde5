// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route an intent guess to the matching schedule operation and phrase the
//! reply shown in the chat.

use crate::models::{Activity, Intent, IntentGuess};
use crate::services::aliases::alias_arguments;
use crate::services::hackathons::{find_hackathons, HackathonResults};
use crate::services::normalize::{normalize_new_activity, updates_from_args};
use crate::services::schedule::{OperationResult, RequestContext, ScheduleService};
use serde::Serialize;
use serde_json::Value;

/// Guesses below this confidence are not acted on.
pub const MIN_CONFIDENCE: f64 = 0.6;

pub const UNSURE_REPLY: &str = "I'm not sure what you want to do.";
pub const UNSUPPORTED_REPLY: &str = "That action isn't supported yet.";
const DONE_REPLY: &str = "Done ✅";

/// Outcome of a multi-item add.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub message: String,
    pub details: Vec<OperationResult>,
}

/// Operation payload attached to a chat reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatResult {
    Batch(BatchResult),
    Operation(OperationResult),
    Schedule(Vec<Activity>),
    Hackathons(HackathonResults),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ChatResult>,
    /// The caller should re-fetch the schedule
    pub refresh_needed: bool,
}

impl ChatReply {
    fn text(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            result: None,
            refresh_needed: false,
        }
    }
}

/// Handle one oracle guess for one chat message.
pub async fn dispatch(
    service: &ScheduleService,
    guess: IntentGuess,
    ctx: &RequestContext,
) -> ChatReply {
    // NaN confidence counts as low
    let confident = guess.confidence >= MIN_CONFIDENCE;
    let Some(name) = guess.intent_name().filter(|_| confident) else {
        tracing::info!(
            intent = ?guess.intent,
            confidence = guess.confidence,
            "No confident intent"
        );
        return ChatReply::text(UNSURE_REPLY);
    };

    let Some(intent) = Intent::from_name(name) else {
        tracing::info!(intent = name, "Unsupported intent");
        return ChatReply::text(UNSUPPORTED_REPLY);
    };

    tracing::debug!(intent = intent.as_str(), confidence = guess.confidence, "Dispatching intent");

    match intent {
        Intent::AddActivity => add_batch(service, &guess.arguments, ctx).await,
        Intent::UpdateActivity => {
            let args = alias_arguments(single_arguments(&guess.arguments));
            let id = args.id;
            let outcome = service
                .update_activity(id, updates_from_args(args), ctx)
                .await;
            single_reply(OperationResult::from_outcome(outcome), "Updated! ✅", "Failed to update")
        }
        Intent::DeleteActivity => {
            let args = alias_arguments(single_arguments(&guess.arguments));
            let outcome = service.delete_activity(args.id, ctx).await;
            single_reply(OperationResult::from_outcome(outcome), "Deleted! 🗑️", "Failed to delete")
        }
        Intent::GetSchedule => {
            let result = match service.get_schedule(ctx).await {
                Ok(activities) => ChatResult::Schedule(activities),
                Err(e) => ChatResult::Operation(OperationResult::failure(&e)),
            };
            ChatReply {
                reply: DONE_REPLY.to_string(),
                result: Some(result),
                refresh_needed: false,
            }
        }
        Intent::FindHackathons => {
            let args = alias_arguments(single_arguments(&guess.arguments));
            ChatReply {
                reply: DONE_REPLY.to_string(),
                result: Some(ChatResult::Hackathons(find_hackathons(args.query.as_deref()))),
                refresh_needed: false,
            }
        }
    }
}

static NO_ARGUMENTS: Value = Value::Null;

/// Non-add intents act on one argument object; take the first of a list.
fn single_arguments(arguments: &Value) -> &Value {
    match arguments {
        Value::Array(items) => items.first().unwrap_or(&NO_ARGUMENTS),
        other => other,
    }
}

fn single_reply(result: OperationResult, success_reply: &str, failure_prefix: &str) -> ChatReply {
    let reply = if result.success {
        success_reply.to_string()
    } else {
        format!("{}: {}", failure_prefix, result.reason())
    };
    ChatReply {
        reply,
        refresh_needed: result.success,
        result: Some(ChatResult::Operation(result)),
    }
}

/// Add every item in turn. A failed item does not stop the rest.
///
/// Items run one after another so each sees the ids assigned before it.
async fn add_batch(service: &ScheduleService, arguments: &Value, ctx: &RequestContext) -> ChatReply {
    let items: Vec<&Value> = match arguments {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut details = Vec::with_capacity(items.len());
    for item in items {
        let outcome = match normalize_new_activity(alias_arguments(item)) {
            Ok(draft) => service.add_activity(draft, ctx).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "Error adding task");
        }
        details.push(OperationResult::from_outcome(outcome));
    }

    let succeeded = details.iter().filter(|r| r.success).count();
    let failed = details.len() - succeeded;

    let reply = match (succeeded, failed) {
        (s, 0) if s > 1 => "Done! I've added all your tasks.".to_string(),
        (s, 0) if s == 1 => "Done! Added the activity.".to_string(),
        (s, f) if s > 0 => format!("Partially successful. Added {} tasks, but {} failed.", s, f),
        _ => format!(
            "I couldn't add that. Error: {}",
            details
                .first()
                .map(OperationResult::reason)
                .unwrap_or("Unknown error")
        ),
    };

    ChatReply {
        reply,
        result: Some(ChatResult::Batch(BatchResult {
            message: format!("Processed {} requests.", details.len()),
            details,
        })),
        refresh_needed: succeeded > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_arguments_takes_first_of_list() {
        let args = json!([{ "id": 3 }, { "id": 4 }]);
        assert_eq!(single_arguments(&args), &json!({ "id": 3 }));
        assert_eq!(single_arguments(&json!([])), &Value::Null);
        assert_eq!(single_arguments(&json!({ "id": 9 })), &json!({ "id": 9 }));
    }

    #[test]
    fn test_single_reply_failure_uses_reason() {
        let failed = OperationResult::failure(&crate::error::ScheduleError::ActivityNotFound);
        let reply = single_reply(failed, "Updated! ✅", "Failed to update");
        assert_eq!(reply.reply, "Failed to update: Activity not found.");
        assert!(!reply.refresh_needed);
    }

    #[test]
    fn test_reply_serializes_camel_case() {
        let reply = ChatReply::text(UNSURE_REPLY);
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "reply": "I'm not sure what you want to do.", "refreshNeeded": false })
        );
    }
}
