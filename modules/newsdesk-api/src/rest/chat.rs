use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use newsdesk_common::Role;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::rest::owned_session;
use crate::AppState;

pub const CHAT_STARTED: &str = "Chat processing started";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: Uuid,
}

/// Record the user's question and start a streaming run in the background.
/// Progress arrives on the session's websocket, not in this response.
pub async fn start_chat(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    owned_session(&state, session_id, auth.user_id).await?;

    state
        .transcripts
        .append(session_id, Role::User, &request.user_query)
        .await?;

    let pipeline = state.pipeline.clone();
    let query = request.user_query;
    tokio::spawn(async move {
        pipeline.stream_run(session_id, &query).await;
    });

    info!(%session_id, "Chat run started");
    Ok(Json(ChatResponse {
        message: CHAT_STARTED.to_string(),
        session_id,
    }))
}
