//! Types for chat-completion requests, responses and probe results.

use crate::client::HeaderSet;
use serde::{Deserialize, Serialize};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a request with a single user message.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: 32,
            temperature: 0.2,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from `/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Raw outcome of one HTTP attempt.
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub headers: HeaderSet,
    pub status: u16,
    pub body: String,
}

impl ProbeAttempt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// All attempts made by one probe run, in order.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub attempts: Vec<ProbeAttempt>,
}

impl ProbeReport {
    pub fn succeeded(&self) -> bool {
        self.attempts.last().is_some_and(ProbeAttempt::is_success)
    }

    /// Text of the first choice, when the final attempt returned a parseable reply.
    pub fn reply(&self) -> Option<String> {
        let last = self.attempts.last().filter(|a| a.is_success())?;
        let response: ChatResponse = serde_json::from_str(&last.body).ok()?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
    }
}
