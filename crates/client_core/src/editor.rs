use std::sync::Arc;

use shared::domain::{Notification, NotificationId};
use tracing::debug;

use crate::events::{EventManager, NOTIFICATION_LIST_TOPIC};
use crate::resource::{ClientError, NotificationResource};

/// Mutation flow for the notification entity. Mutations never patch local
/// state: each one performs the remote call and then publishes the change
/// topic so every mounted list reloads from the server.
pub struct NotificationEditor {
    resource: Arc<dyn NotificationResource>,
    events: Arc<EventManager>,
}

impl NotificationEditor {
    pub fn new(resource: Arc<dyn NotificationResource>, events: Arc<EventManager>) -> Self {
        Self { resource, events }
    }

    /// Creates the entity when it has no id yet, updates it otherwise.
    /// Publishes the change topic only after the server accepted the call.
    pub async fn save(&self, entity: Notification) -> Result<Notification, ClientError> {
        let saved = if entity.is_persisted() {
            self.resource.update(&entity).await?
        } else {
            self.resource.create(&entity).await?
        };
        debug!(id = ?saved.id, "notification saved, publishing change topic");
        self.events.publish(NOTIFICATION_LIST_TOPIC, None);
        Ok(saved)
    }

    pub async fn delete(&self, id: NotificationId) -> Result<(), ClientError> {
        self.resource.remove(id).await?;
        debug!(%id, "notification deleted, publishing change topic");
        self.events.publish(NOTIFICATION_LIST_TOPIC, None);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
