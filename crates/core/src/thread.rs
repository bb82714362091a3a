//! Thread and Turn domain types.
//!
//! These are the persisted conversation records: a promoter owns Threads,
//! a Thread owns an ordered sequence of immutable Turns. The orchestrator
//! in `copiloto-chat` is the only writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a thread title derived from the first message.
pub const TITLE_MAX_CHARS: usize = 50;

/// The role of a turn within a thread.
///
/// A closed two-value tag. The model endpoint only ever sees these two
/// roles; persona instructions travel as a separate top-level field, never
/// as a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The promoter asking.
    User,
    /// The copilot answering.
    Assistant,
}

impl Role {
    /// The wire/database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a stored role string. Anything outside the closed set is a
    /// corrupt row, not a new role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable message within a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Row id.
    pub id: i64,

    /// Owning thread.
    pub thread_id: i64,

    /// Who produced this turn.
    pub role: Role,

    /// The text content.
    pub content: String,

    /// Creation timestamp; turns are totally ordered by it within a thread.
    pub created_at: DateTime<Utc>,
}

/// A persisted, promoter-scoped conversation with the copilot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Row id.
    pub id: i64,

    /// Owning promoter.
    pub user_id: i64,

    /// Display title, derived from the first message and never recomputed.
    pub title: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thread metadata for list views — no turn bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: i64,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

/// Derive a thread title from its first message.
///
/// Truncates by character count (not word boundary) at [`TITLE_MAX_CHARS`]
/// and appends an ellipsis marker when anything was cut. This is the only
/// string-truncation rule in the system.
pub fn derive_title(first_message: &str) -> String {
    let mut chars = first_message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn role_rejects_open_strings() {
        assert_eq!(Role::parse("system"), None);
        assert_eq!(Role::parse("tool"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn short_title_is_verbatim() {
        let msg = "Hola, necesito ayuda con un cliente";
        assert!(msg.chars().count() <= TITLE_MAX_CHARS);
        assert_eq!(derive_title(msg), msg);
    }

    #[test]
    fn exactly_fifty_chars_is_not_truncated() {
        let msg = "a".repeat(50);
        assert_eq!(derive_title(&msg), msg);
    }

    #[test]
    fn long_title_truncates_with_ellipsis() {
        let msg = "x".repeat(80);
        let title = derive_title(&msg);
        assert_eq!(title, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        // 60 multibyte chars; byte-indexed truncation would split a char
        let msg = "ñ".repeat(60);
        let title = derive_title(&msg);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }
}
