pub mod auth;
pub mod db;
pub mod deps;
pub mod error;
pub mod rest;
pub mod routes;

use std::sync::Arc;

use newsdesk_chat::{ChatPipeline, SessionStore, TranscriptStore};

use crate::auth::JwtService;

/// Shared handler state.
pub struct AppState {
    pub jwt: JwtService,
    pub sessions: Arc<dyn SessionStore>,
    pub transcripts: Arc<dyn TranscriptStore>,
    pub pipeline: Arc<ChatPipeline>,
}
