//! Client-side core for the notification service: the HTTP resource client,
//! the in-process change notifier, the list view controller and the mutation
//! flow that ties them together.

pub mod controller;
pub mod editor;
pub mod events;
pub mod resource;

pub use controller::{
    Account, AlertSink, AnonymousIdentity, IdentityProvider, ListSnapshot, LoadState,
    NotificationListController, TracingAlertSink,
};
pub use editor::NotificationEditor;
pub use events::{ChangeEvent, EventManager, Subscription, NOTIFICATION_LIST_TOPIC};
pub use resource::{ClientError, NotificationClient, NotificationResource};
