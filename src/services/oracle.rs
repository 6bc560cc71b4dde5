// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intent extraction from free-text chat messages.
//!
//! The oracle never fails from the caller's point of view: transport errors,
//! a missing API key, or a reply that isn't the expected JSON all degrade to
//! [`IntentGuess::none`].

use crate::error::AppError;
use crate::models::IntentGuess;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Turns a chat message into an intent guess.
#[async_trait]
pub trait IntentOracle: Send + Sync {
    async fn extract_intent(&self, message: &str) -> IntentGuess;

    /// Whether the oracle has what it needs to answer at all.
    fn is_configured(&self) -> bool {
        true
    }
}

fn extraction_prompt(message: &str) -> String {
    format!(
        r#"You are an intent extraction engine.

Return ONLY valid JSON.
No markdown. No commentary.

IMPORTANT:
- Use ONLY the field names defined below
- DO NOT invent new field names
- Map user language to these exact keys

Schema:
{{
  "intent": "getSchedule" | "addActivity" | "updateActivity" | "deleteActivity" | "findHackathons" | null,
  "arguments": {{ ... }} OR [ {{ ... }}, {{ ... }} ],
  "confidence": number
}}

Mapping rules:
- "activity", "task", "event" -> title
- "time", "at", "starts" -> startTime
- "for X minutes/hours" -> duration
- "with tags X, Y" or "tagged as X" -> tags (array of strings)
- "on Mondays", "every Tuesday", "weekdays", "daily" -> days (array of strings, e.g. ["Monday", "Tuesday"])
- Relative days such as "tomorrow" -> the matching weekday name (Monday-Sunday)

MULTIPLE TASKS:
If the user wants to add multiple activities (e.g. "Swim at 10pm AND Read at 8am"),
set "intent" to "addActivity" and make "arguments" an ARRAY of objects.
Example: "arguments": [{{ "title": "Swim", "time": "10pm" }}, {{ "title": "Read", "time": "8am", "tags": ["study"] }}]

Rules:
- If required fields are missing, still return best guess
- confidence must be between 0 and 1

User message:
"{message}"
"#
    )
}

/// Parse the oracle's text reply, tolerating markdown code fences.
pub fn parse_intent_payload(text: &str) -> IntentGuess {
    let cleaned = text.replace("```json", "").replace("```", "");
    match serde_json::from_str::<IntentGuess>(cleaned.trim()) {
        Ok(guess) => guess,
        Err(e) => {
            tracing::warn!(error = %e, raw = %text, "Intent JSON parse failed");
            IntentGuess::none()
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiOracle {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiOracle {
    pub fn new(api_key: Option<String>, model: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed building Gemini HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Oracle(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Oracle(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Oracle(format!("JSON parse error: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::Oracle("Empty response".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl IntentOracle for GeminiOracle {
    async fn extract_intent(&self, message: &str) -> IntentGuess {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("GEMINI_API_KEY not set, skipping intent extraction");
            return IntentGuess::none();
        };

        match self.generate(api_key, &extraction_prompt(message)).await {
            Ok(text) => parse_intent_payload(&text),
            Err(e) => {
                tracing::error!(error = %e, "Intent extraction failed");
                IntentGuess::none()
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
