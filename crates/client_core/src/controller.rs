use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shared::domain::{Notification, NotificationId};
use tracing::{debug, error, warn};

use crate::events::{EventManager, Subscription, NOTIFICATION_LIST_TOPIC};
use crate::resource::{ClientError, NotificationResource};

/// Current-user descriptor resolved from the identity collaborator. Read-only
/// display/authorization context; never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub login: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn identity(&self) -> anyhow::Result<Option<Account>>;
}

/// Default identity provider: nobody is signed in.
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityProvider for AnonymousIdentity {
    async fn identity(&self) -> anyhow::Result<Option<Account>> {
        Ok(None)
    }
}

/// Fire-and-forget error surface consumed on query failure.
pub trait AlertSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Default alert sink: routes failure messages to the log.
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn error(&self, message: &str) {
        error!(%message, "notification list load failed");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Loaded,
    Error,
}

/// Point-in-time view of the controller for rendering. `notifications` stays
/// `None` until the first successful load, so "never loaded" is
/// distinguishable from "loaded empty".
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub state: LoadState,
    pub notifications: Option<Vec<Notification>>,
    pub account: Option<Account>,
}

struct ControllerState {
    state: LoadState,
    notifications: Option<Vec<Notification>>,
    account: Option<Account>,
    // Sequence number of the most recently issued query. A completion whose
    // sequence no longer matches is stale and must not touch the view.
    issue_seq: u64,
    started: bool,
    stopped: bool,
    subscription: Option<Subscription>,
}

/// Owns the loading/loaded/error state of the notification collection view.
///
/// `start` issues the initial load, resolves the current account and
/// subscribes to [`NOTIFICATION_LIST_TOPIC`]; every publish on that topic
/// triggers a full reload. Overlapping reloads are not coalesced; the result
/// of the most recently issued query wins regardless of completion order.
/// `stop` unsubscribes and silences any in-flight completion.
pub struct NotificationListController {
    resource: Arc<dyn NotificationResource>,
    events: Arc<EventManager>,
    identity: Arc<dyn IdentityProvider>,
    alerts: Arc<dyn AlertSink>,
    inner: Mutex<ControllerState>,
}

impl NotificationListController {
    pub fn new(resource: Arc<dyn NotificationResource>, events: Arc<EventManager>) -> Arc<Self> {
        Self::new_with_collaborators(
            resource,
            events,
            Arc::new(AnonymousIdentity),
            Arc::new(TracingAlertSink),
        )
    }

    pub fn new_with_collaborators(
        resource: Arc<dyn NotificationResource>,
        events: Arc<EventManager>,
        identity: Arc<dyn IdentityProvider>,
        alerts: Arc<dyn AlertSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            resource,
            events,
            identity,
            alerts,
            inner: Mutex::new(ControllerState {
                state: LoadState::Uninitialized,
                notifications: None,
                account: None,
                issue_seq: 0,
                started: false,
                stopped: false,
                subscription: None,
            }),
        })
    }

    /// Activates the view. Idempotent; a second call is a no-op.
    pub fn start(self: &Arc<Self>) {
        {
            let mut inner = self.lock();
            if inner.started {
                return;
            }
            inner.started = true;
        }
        self.load_all();
        self.resolve_identity();
        let weak = Arc::downgrade(self);
        let subscription = self.events.subscribe(NOTIFICATION_LIST_TOPIC, move |_event| {
            if let Some(controller) = weak.upgrade() {
                controller.load_all();
            }
        });
        self.lock().subscription = Some(subscription);
    }

    /// Deactivates the view: unsubscribes from the change topic and marks the
    /// controller stopped, exactly once. In-flight query completions arriving
    /// afterwards are dropped; there is no network-level cancellation.
    pub fn stop(&self) {
        let subscription = {
            let mut inner = self.lock();
            if inner.stopped {
                return;
            }
            inner.stopped = true;
            inner.subscription.take()
        };
        if let Some(subscription) = subscription {
            self.events.unsubscribe(&subscription);
        }
    }

    /// Issues a fresh `query()` for the full collection. Called on activation
    /// and on every change notification; never patches local state from a
    /// notification payload.
    pub fn load_all(self: &Arc<Self>) {
        let seq = {
            let mut inner = self.lock();
            if inner.stopped {
                return;
            }
            inner.issue_seq += 1;
            inner.state = LoadState::Loading;
            inner.issue_seq
        };
        debug!(seq, "reloading notification collection");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = this.resource.query().await;
            this.apply_query_result(seq, result);
        });
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let inner = self.lock();
        ListSnapshot {
            state: inner.state,
            notifications: inner.notifications.clone(),
            account: inner.account.clone(),
        }
    }

    /// Stable per-item key for list reconciliation: the item's id.
    pub fn track_id(&self, item: &Notification) -> Option<NotificationId> {
        item.id
    }

    fn apply_query_result(&self, seq: u64, result: Result<Vec<Notification>, ClientError>) {
        let failure = {
            let mut inner = self.lock();
            if inner.stopped {
                return;
            }
            if seq != inner.issue_seq {
                debug!(seq, current = inner.issue_seq, "dropping stale query result");
                return;
            }
            match result {
                Ok(notifications) => {
                    inner.state = LoadState::Loaded;
                    inner.notifications = Some(notifications);
                    None
                }
                Err(err) => {
                    // Collection is left as-is: the previous result (or None
                    // before the first load) remains on display.
                    inner.state = LoadState::Error;
                    Some(err.to_string())
                }
            }
        };
        if let Some(message) = failure {
            self.alerts.error(&message);
        }
    }

    fn resolve_identity(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.identity.identity().await {
                Ok(account) => {
                    let mut inner = this.lock();
                    if !inner.stopped {
                        inner.account = account;
                    }
                }
                // Best-effort side read; a failure never blocks the list.
                Err(err) => warn!(%err, "identity resolution failed"),
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
