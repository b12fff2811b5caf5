pub mod answer;
pub mod chat;
pub mod sessions;
pub mod stream;

use uuid::Uuid;

use newsdesk_common::Session;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const SESSION_NOT_FOUND: &str = "Session not found or you don't have access to it";

/// The caller's session, or 404 when it is missing or owned by someone else.
pub(crate) async fn owned_session(
    state: &AppState,
    session_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Session> {
    state
        .sessions
        .find_owned(session_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(SESSION_NOT_FOUND.to_string()))
}
