//! Core types for SimplifIA — the HTTP request/response bodies and the
//! OpenAI-compatible chat completions wire format shared by the adapters.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Public API bodies
// ─────────────────────────────────────────────

/// Body of `POST /api/simplify`.
///
/// Created per request and discarded after the response is sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimplifyRequest {
    /// The text to explain.
    pub text: String,
    /// Explanation level key (e.g. `"enfant"`, `"genie"`).
    pub level: String,
    /// Provider tag, matched case-insensitively (e.g. `"openai"`).
    pub provider: String,
}

impl SimplifyRequest {
    pub fn new(
        text: impl Into<String>,
        level: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        SimplifyRequest {
            text: text.into(),
            level: level.into(),
            provider: provider.into(),
        }
    }
}

/// Successful response body. `output` is always a string, including for
/// soft failures (missing key, insufficient credit, provider errors).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimplifyResponse {
    pub output: String,
}

impl SimplifyResponse {
    pub fn new(output: impl Into<String>) -> Self {
        SimplifyResponse {
            output: output.into(),
        }
    }
}

/// Body of a hard-failure response (HTTP 400 / 500).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Only the two roles the relay ever sends are modelled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion request / response
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Why the first choice stopped (`"stop"`, `"length"`, `"content_filter"`, ...).
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }

    /// Content of the first choice, if it is present and non-empty.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

/// Error envelope returned by OpenAI-compatible and Google APIs.
///
/// `{"error": {"message": "...", "type": "...", "code": "...", "status": "..."}}`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

/// Inner object of [`ApiErrorEnvelope`]. Every field is optional since
/// providers disagree on which ones they fill.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    /// OpenAI uses a string code, Google a numeric one.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Google RPC status, e.g. `"RESOURCE_EXHAUSTED"`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorDetail {
    /// The most specific machine-readable code available.
    pub fn code_str(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => self.status.clone().or_else(|| self.error_type.clone()),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
