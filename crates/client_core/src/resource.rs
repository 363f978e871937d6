use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Notification, NotificationId},
    error::ApiError,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Typed failure for a single remote call. Every variant carries a
/// human-readable message suitable for forwarding to an alert surface.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// CRUD surface for the notification collection. The controller and editor
/// depend on this trait so tests can substitute scripted implementations.
#[async_trait]
pub trait NotificationResource: Send + Sync {
    async fn query(&self) -> Result<Vec<Notification>, ClientError>;
    async fn get(&self, id: NotificationId) -> Result<Notification, ClientError>;
    async fn create(&self, entity: &Notification) -> Result<Notification, ClientError>;
    async fn update(&self, entity: &Notification) -> Result<Notification, ClientError>;
    async fn remove(&self, id: NotificationId) -> Result<(), ClientError>;
}

/// Stateless HTTP client for the remote notification resource. No retry and
/// no caching; every call is a fresh round trip.
#[derive(Debug)]
pub struct NotificationClient {
    http: Client,
    base_url: String,
}

impl NotificationClient {
    pub fn new(server_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let parsed = Url::parse(server_url.as_ref())
            .map_err(|err| ClientError::Validation(format!("invalid server url: {err}")))?;
        Ok(Self {
            http: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/api/notifications", self.base_url)
    }

    fn entity_url(&self, id: NotificationId) -> String {
        format!("{}/api/notifications/{}", self.base_url, id.0)
    }
}

/// Maps a non-success response to [`ClientError::Status`], preferring the
/// message from an [`ApiError`] body when the server sent one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|api| api.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    Err(ClientError::Status { status, message })
}

#[async_trait]
impl NotificationResource for NotificationClient {
    async fn query(&self) -> Result<Vec<Notification>, ClientError> {
        debug!("querying notification collection");
        let response = self.http.get(self.collection_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn get(&self, id: NotificationId) -> Result<Notification, ClientError> {
        debug!(%id, "fetching notification");
        let response = self.http.get(self.entity_url(id)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, entity: &Notification) -> Result<Notification, ClientError> {
        if entity.is_persisted() {
            return Err(ClientError::Validation(
                "a new notification cannot already have an id".into(),
            ));
        }
        debug!("creating notification");
        let response = self
            .http
            .post(self.collection_url())
            .json(entity)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, entity: &Notification) -> Result<Notification, ClientError> {
        let id = entity.id.ok_or_else(|| {
            ClientError::Validation("cannot update a notification without an id".into())
        })?;
        debug!(%id, "updating notification");
        let response = self
            .http
            .put(self.entity_url(id))
            .json(entity)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn remove(&self, id: NotificationId) -> Result<(), ClientError> {
        debug!(%id, "deleting notification");
        let response = self.http.delete(self.entity_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
