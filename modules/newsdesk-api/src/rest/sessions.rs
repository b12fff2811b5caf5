use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use newsdesk_common::{Session, TranscriptMessage};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::rest::owned_session;
use crate::AppState;

pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            title: s.title,
            user_id: s.owner_id,
            created_at: s.created_at,
        }
    }
}

pub async fn create_session(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.create(auth.user_id, DEFAULT_TITLE).await?;
    tracing::info!(session_id = %session.id, "Session created");
    Ok(Json(session.into()))
}

pub async fn list_sessions(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let sessions = state.sessions.list_for_owner(auth.user_id).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

pub async fn list_messages(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TranscriptMessage>>> {
    owned_session(&state, session_id, auth.user_id).await?;
    let messages = state.transcripts.list(session_id).await?;
    Ok(Json(messages))
}
