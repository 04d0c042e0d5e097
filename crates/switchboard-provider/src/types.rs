use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user message
    User,
    /// Backend response
    Assistant,
}

/// One message in the history sent to a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: Role,
    /// Text content
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Successful outcome of one exchange against a backend
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    /// Response text
    pub content: String,
    /// Wire-level model identifier that produced the response
    pub model_used: String,
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens generated in the response
    pub output_tokens: u32,
    /// Settled cost of this exchange (USD)
    pub actual_cost: f64,
    /// Wall-clock time spent on the call
    pub latency: Duration,
}
