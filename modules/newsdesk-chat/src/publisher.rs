use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, warn};
use uuid::Uuid;

use newsdesk_common::{ChatEvent, Role};

use crate::bus::ChannelLease;
use crate::traits::TranscriptStore;

/// Where a run reports user-visible progress.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn publish(&self, content: &str);
}

/// Persist, then broadcast. Both are best effort: a failed or timed-out
/// append is logged and the broadcast still goes out.
///
/// Each publish runs on its own task once it holds the ordering lock, so
/// cancelling the caller (run deadline) never separates a persisted row from
/// its broadcast. Publishes complete in call order.
pub struct PublishSink {
    transcripts: Arc<dyn TranscriptStore>,
    lease: ChannelLease,
    persist_timeout: Duration,
    order: Arc<Mutex<()>>,
}

impl PublishSink {
    pub fn new(
        transcripts: Arc<dyn TranscriptStore>,
        lease: ChannelLease,
        persist_timeout: Duration,
    ) -> Self {
        Self {
            transcripts,
            lease,
            persist_timeout,
            order: Arc::new(Mutex::new(())),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.lease.session_id()
    }
}

#[async_trait]
impl ProgressSink for PublishSink {
    async fn publish(&self, content: &str) {
        // Dropped while waiting here: nothing was written, nothing is sent.
        let turn = self.order.clone().lock_owned().await;

        let session_id = self.session_id();
        let transcripts = self.transcripts.clone();
        let sender = self.lease.sender();
        let persist_timeout = self.persist_timeout;
        let content = content.to_string();

        let pair = tokio::spawn(async move {
            let _turn = turn;
            persist(transcripts.as_ref(), session_id, &content, persist_timeout).await;
            broadcast_event(&sender, ChatEvent::assistant(session_id, content));
        });

        if let Err(e) = pair.await {
            error!(%session_id, error = %e, "Publish task failed");
        }
    }
}

async fn persist(
    transcripts: &dyn TranscriptStore,
    session_id: Uuid,
    content: &str,
    limit: Duration,
) {
    match tokio::time::timeout(limit, transcripts.append(session_id, Role::Assistant, content))
        .await
    {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!(%session_id, error = %e, "Failed to persist assistant message"),
        Err(_) => warn!(
            %session_id,
            timeout_secs = limit.as_secs(),
            "Timed out persisting assistant message"
        ),
    }
}

fn broadcast_event(sender: &broadcast::Sender<ChatEvent>, event: ChatEvent) {
    let session_id = event.session_id;
    match sender.send(event) {
        Ok(receivers) => debug!(%session_id, receivers, "Broadcast progress"),
        Err(_) => debug!(%session_id, "No live subscribers for progress event"),
    }
}

/// Discards progress. Used by the direct answer path.
pub struct NoopSink;

#[async_trait]
impl ProgressSink for NoopSink {
    async fn publish(&self, _content: &str) {}
}
