// Trait seams for the chat pipeline's collaborators.
//
// IntentClassifier, NewsSearch, ArticleSummarizer, AnswerWriter wrap the
// remote services. TranscriptStore and SessionStore wrap Postgres.
//
// Stage functions in this crate turn every error from these traits into an
// empty result or a terminal message. Mocks live in `testing`.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use newsdesk_common::{
    CandidateArticle, IntentVerdict, Role, ScrapedArticle, Session, SourceSummary,
    TranscriptMessage,
};

// ---------------------------------------------------------------------------
// Remote collaborators
// ---------------------------------------------------------------------------

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Decide whether `query` asks about news or current events.
    async fn classify(&self, query: &str) -> Result<IntentVerdict>;
}

#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Candidate articles for `topic` from the trusted sites, in provider order.
    async fn search(&self, topic: &str) -> Result<Vec<CandidateArticle>>;
}

#[async_trait]
pub trait ArticleSummarizer: Send + Sync {
    async fn summarize(&self, article: &ScrapedArticle) -> Result<String>;
}

#[async_trait]
pub trait AnswerWriter: Send + Sync {
    /// Raw model answer. Formatting cleanup happens in the synthesizer.
    async fn write(
        &self,
        query: &str,
        summaries: &[SourceSummary],
        markdown: bool,
    ) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(&self, session_id: Uuid, role: Role, content: &str)
        -> Result<TranscriptMessage>;

    /// Oldest first.
    async fn list(&self, session_id: Uuid) -> Result<Vec<TranscriptMessage>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, owner_id: Uuid, title: &str) -> Result<Session>;

    /// Newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Session>>;

    /// `None` when the session does not exist or belongs to someone else.
    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Session>>;
}
