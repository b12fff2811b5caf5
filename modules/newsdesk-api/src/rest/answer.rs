use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_query: String,
    #[serde(default)]
    pub markdown: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Run the whole pipeline inline and return the final text. Failures come
/// back as the apology text, never as an error status.
pub async fn answer(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnswerRequest>,
) -> Json<AnswerResponse> {
    let answer = state
        .pipeline
        .answer_direct(&request.user_query, request.markdown)
        .await;
    Json(AnswerResponse { answer })
}
