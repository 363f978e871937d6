use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use tracing::debug;

/// Change topic published after every notification mutation. Publishers and
/// the list controller's subscription must agree on this exact string.
pub const NOTIFICATION_LIST_TOPIC: &str = "notificationListModification";

#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub topic: String,
    pub payload: Option<String>,
}

type Handler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle returned by [`EventManager::subscribe`]; identifies exactly one
/// registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    topic: String,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Process-local publish/subscribe registry. An explicit instance rather than
/// a global: every component that publishes or subscribes receives the
/// manager it should use, so tests can construct an isolated one per case.
///
/// Handlers for a topic fire synchronously, in registration order. There is
/// no replay: a handler registered after a publish never observes it.
#[derive(Default)]
pub struct EventManager {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<String, Vec<(u64, Handler)>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        topic: impl Into<String>,
        handler: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let topic = topic.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .entry(topic.clone())
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription { id, topic }
    }

    /// Invokes every handler currently registered for `topic`, in the order
    /// they were registered. Handlers run outside the registry lock, so a
    /// handler may subscribe, unsubscribe or publish again without
    /// deadlocking; anything it registers only sees later publishes.
    pub fn publish(&self, topic: &str, payload: Option<String>) {
        let handlers: Vec<Handler> = self
            .lock()
            .get(topic)
            .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        debug!(topic, subscribers = handlers.len(), "publishing change event");
        let event = ChangeEvent {
            topic: topic.to_string(),
            payload,
        };
        for handler in handlers {
            handler(&event);
        }
    }

    /// Removes the handler behind `subscription`. Idempotent: unsubscribing a
    /// handle that was already removed is a no-op.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut handlers = self.lock();
        if let Some(entries) = handlers.get_mut(&subscription.topic) {
            entries.retain(|(id, _)| *id != subscription.id);
            if entries.is_empty() {
                handlers.remove(&subscription.topic);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(u64, Handler)>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
