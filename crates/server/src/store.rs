use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{Notification, NotificationId};

/// In-memory notification store. Ids are allocated monotonically and never
/// reused within a process lifetime; `list` returns rows ordered by id.
#[derive(Clone, Default)]
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    next_id: i64,
    rows: BTreeMap<NotificationId, Notification>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Notification> {
        self.lock().rows.values().cloned().collect()
    }

    pub fn find(&self, id: NotificationId) -> Option<Notification> {
        self.lock().rows.get(&id).cloned()
    }

    pub fn create(&self, mut entity: Notification) -> Notification {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = NotificationId(inner.next_id);
        entity.id = Some(id);
        inner.rows.insert(id, entity.clone());
        entity
    }

    /// Replaces the stored row; returns `None` when `id` is unknown.
    pub fn update(&self, id: NotificationId, mut entity: Notification) -> Option<Notification> {
        let mut inner = self.lock();
        if !inner.rows.contains_key(&id) {
            return None;
        }
        entity.id = Some(id);
        inner.rows.insert(id, entity.clone());
        Some(entity)
    }

    /// Returns whether a row was actually removed.
    pub fn delete(&self, id: NotificationId) -> bool {
        self.lock().rows.remove(&id).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
