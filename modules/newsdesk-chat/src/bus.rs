use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use newsdesk_common::ChatEvent;

/// Buffered events per session topic before slow receivers start lagging.
pub const DEFAULT_CAPACITY: usize = 64;

struct Topic {
    sender: broadcast::Sender<ChatEvent>,
    leases: usize,
}

/// One broadcast topic per session. Topics are created on first use and
/// removed once no run holds a lease and nobody is subscribed.
pub struct SessionBus {
    topics: Mutex<HashMap<Uuid, Topic>>,
    capacity: usize,
}

impl SessionBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<Uuid, Topic>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn topic<'a>(
        topics: &'a mut HashMap<Uuid, Topic>,
        session_id: Uuid,
        capacity: usize,
    ) -> &'a mut Topic {
        topics.entry(session_id).or_insert_with(|| Topic {
            sender: broadcast::channel(capacity).0,
            leases: 0,
        })
    }

    pub fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<ChatEvent> {
        let mut topics = self.topics();
        Self::topic(&mut topics, session_id, self.capacity)
            .sender
            .subscribe()
    }

    /// Receiver that prunes the session topic when dropped, whether or not
    /// it was ever polled.
    pub fn subscription(self: &Arc<Self>, session_id: Uuid) -> Subscription {
        Subscription {
            rx: Some(self.subscribe(session_id)),
            bus: Arc::clone(self),
            session_id,
        }
    }

    /// Hold the session topic open for the duration of one run.
    pub fn lease(self: &Arc<Self>, session_id: Uuid) -> ChannelLease {
        let mut topics = self.topics();
        let topic = Self::topic(&mut topics, session_id, self.capacity);
        topic.leases += 1;
        ChannelLease {
            bus: Arc::clone(self),
            session_id,
            sender: topic.sender.clone(),
        }
    }

    /// Drop the topic if it is idle. Call after a subscriber goes away.
    pub fn prune(&self, session_id: Uuid) {
        let mut topics = self.topics();
        let idle = topics
            .get(&session_id)
            .is_some_and(|t| t.leases == 0 && t.sender.receiver_count() == 0);
        if idle {
            topics.remove(&session_id);
            debug!(%session_id, "Session topic removed");
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics().len()
    }

    fn release(&self, session_id: Uuid) {
        {
            let mut topics = self.topics();
            if let Some(topic) = topics.get_mut(&session_id) {
                topic.leases = topic.leases.saturating_sub(1);
            }
        }
        self.prune(session_id);
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Sending half of a session topic, held by a single run. Released on drop,
/// including when the run future is cancelled or unwinds.
pub struct ChannelLease {
    bus: Arc<SessionBus>,
    session_id: Uuid,
    sender: broadcast::Sender<ChatEvent>,
}

impl ChannelLease {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Number of receivers reached. Errors when nobody is listening.
    pub fn send(
        &self,
        event: ChatEvent,
    ) -> Result<usize, broadcast::error::SendError<ChatEvent>> {
        self.sender.send(event)
    }

    /// Detached sending handle. Sends through it still reach this topic's
    /// receivers after the lease itself is dropped.
    pub(crate) fn sender(&self) -> broadcast::Sender<ChatEvent> {
        self.sender.clone()
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        self.bus.release(self.session_id);
    }
}

/// Receiving half of a session topic owned by one stream client.
pub struct Subscription {
    rx: Option<broadcast::Receiver<ChatEvent>>,
    bus: Arc<SessionBus>,
    session_id: Uuid,
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<ChatEvent, broadcast::error::RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(broadcast::error::RecvError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The receiver must be gone before prune counts receivers.
        drop(self.rx.take());
        self.bus.prune(self.session_id);
    }
}
