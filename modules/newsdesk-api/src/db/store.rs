use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use newsdesk_chat::{SessionStore, TranscriptStore};
use newsdesk_common::{Role, Session, TranscriptMessage};

use super::models::{chat_message, chat_session};

/// Postgres-backed `SessionStore`.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, owner_id: Uuid, title: &str) -> Result<Session> {
        Ok(chat_session::insert(&self.pool, owner_id, title).await?)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Session>> {
        Ok(chat_session::list_by_user(&self.pool, owner_id).await?)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        Ok(chat_session::find_owned(&self.pool, id, owner_id).await?)
    }
}

/// Postgres-backed `TranscriptStore`.
#[derive(Clone)]
pub struct PgTranscriptStore {
    pool: PgPool,
}

impl PgTranscriptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranscriptStore for PgTranscriptStore {
    async fn append(&self, session_id: Uuid, role: Role, content: &str) -> Result<TranscriptMessage> {
        Ok(chat_message::insert(&self.pool, session_id, role, content).await?)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<TranscriptMessage>> {
        Ok(chat_message::list_by_session(&self.pool, session_id).await?)
    }
}
