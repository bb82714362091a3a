//! ModelClient trait — the abstraction over the hosted model endpoint.
//!
//! A ModelClient turns (instructions, ordered history) into generated text.
//! Which implementation is used — the live Messages API client or the
//! deterministic canned responder — is a configuration-time decision made
//! at the composition root, never inside the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::thread::Role;

/// One (role, content) pair of conversation history sent to the model.
///
/// A projection of [`crate::Turn`] without persistence identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One model invocation: merged instructions plus the full ordered history,
/// new user message last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The merged instruction block (persona + situational context).
    pub instructions: String,

    /// Prior turns in creation order, with the new user message appended
    /// as the final element. Never re-ordered or deduplicated.
    pub turns: Vec<ChatTurn>,
}

/// Token usage reported by the model endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A successful reply from a model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReply {
    /// The generated text.
    pub text: String,

    /// Token usage, when the endpoint reports it.
    pub usage: Option<TokenUsage>,
}

/// The ephemeral outcome of one model invocation, after failure recovery.
///
/// Never persisted as-is; the orchestrator records `text` as the assistant
/// turn whether or not the call succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOutcome {
    pub success: bool,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelOutcome {
    /// Wrap a successful reply.
    pub fn ok(reply: ModelReply) -> Self {
        Self {
            success: true,
            text: reply.text,
            usage: reply.usage,
            error: None,
        }
    }

    /// Degraded outcome carrying a user-presentable fallback text.
    pub fn degraded(fallback_text: impl Into<String>, error: &ModelError) -> Self {
        Self {
            success: false,
            text: fallback_text.into(),
            usage: None,
            error: Some(error.to_string()),
        }
    }
}

/// The core model seam.
///
/// The orchestrator calls `invoke()` without knowing which backend is wired
/// in. Implementations must not panic on endpoint failure; they return a
/// `ModelError` and the caller decides how to degrade.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// A human-readable name for this client (e.g., "anthropic", "canned").
    fn name(&self) -> &str;

    /// Send a request and get a complete reply.
    async fn invoke(&self, request: ModelRequest) -> std::result::Result<ModelReply, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_turn_constructors() {
        let turn = ChatTurn::user("hola");
        assert_eq!(turn.role, Role::User);
        let turn = ChatTurn::assistant("buenos días");
        assert_eq!(turn.role, Role::Assistant);
    }

    #[test]
    fn ok_outcome_carries_usage() {
        let outcome = ModelOutcome::ok(ModelReply {
            text: "respuesta".into(),
            usage: Some(TokenUsage {
                input_tokens: 12,
                output_tokens: 34,
            }),
        });
        assert!(outcome.success);
        assert_eq!(outcome.text, "respuesta");
        assert_eq!(outcome.usage.unwrap().output_tokens, 34);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn degraded_outcome_keeps_fallback_and_error() {
        let err = ModelError::Network("connection refused".into());
        let outcome = ModelOutcome::degraded("Lo siento, intenta de nuevo.", &err);
        assert!(!outcome.success);
        assert_eq!(outcome.text, "Lo siento, intenta de nuevo.");
        assert!(outcome.error.unwrap().contains("connection refused"));
        assert!(outcome.usage.is_none());
    }

    #[test]
    fn request_serialization_keeps_turn_order() {
        let req = ModelRequest {
            instructions: "persona".into(),
            turns: vec![
                ChatTurn::user("uno"),
                ChatTurn::assistant("dos"),
                ChatTurn::user("tres"),
            ],
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: ModelRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.turns.len(), 3);
        assert_eq!(back.turns[2].content, "tres");
    }
}
