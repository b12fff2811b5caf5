use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Transcript ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One conversation thread. Owned by a user, created before any chat run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only transcript row. Ordered within a session by `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Live progress event sent on a session's broadcast topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
}

impl ChatEvent {
    pub fn assistant(session_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            session_id,
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// --- Articles ---

/// Search hit. Exists only for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    pub link: String,
    /// Provider-supplied, free-form ("3 days ago"). May be empty.
    pub date: String,
}

/// Article text pulled from a known news site, with its attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedArticle {
    pub title: String,
    pub body: String,
    pub source: String,
    pub link: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: String,
    pub link: String,
    pub summary: String,
}

// --- Validation ---

/// Classifier output for a user query. `reason` is diagnostic only and
/// must never reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IntentVerdict {
    /// True when the query asks about verifiable news or current events.
    pub is_valid: bool,
    /// One-sentence internal explanation of the decision.
    pub reason: String,
    /// User-facing explanation when invalid; empty string when valid.
    pub clarification_message: String,
}

impl IntentVerdict {
    pub fn rejected(reason: impl Into<String>, clarification: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            clarification_message: clarification.into(),
        }
    }
}
