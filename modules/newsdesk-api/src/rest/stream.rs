use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use newsdesk_chat::Subscription;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::rest::owned_session;
use crate::AppState;

/// Upgrade to a websocket carrying the session's progress events as JSON.
pub async fn stream(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    owned_session(&state, session_id, auth.user_id).await?;

    // Subscribe before the upgrade completes so nothing published in between
    // is lost. The topic is pruned when the subscription drops, even if the
    // upgrade never happens.
    let subscription = state.pipeline.bus().subscription(session_id);
    Ok(ws.on_upgrade(move |socket| forward_events(socket, subscription, session_id)))
}

async fn forward_events(
    mut socket: WebSocket,
    mut subscription: Subscription,
    session_id: Uuid,
) {
    debug!(%session_id, "Stream subscriber connected");

    loop {
        tokio::select! {
            event = subscription.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!(%session_id, error = %e, "Failed to encode chat event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%session_id, skipped, "Stream subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(subscription);
    debug!(%session_id, "Stream subscriber disconnected");
}
