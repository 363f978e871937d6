use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Notification, NotificationId},
    error::ApiError,
};
use tracing::{debug, info};

mod config;
mod store;

use config::load_settings;
use store::NotificationStore;

#[derive(Clone)]
struct AppState {
    store: NotificationStore,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn reply(status: StatusCode, error: ApiError) -> (StatusCode, Json<ApiError>) {
    (status, Json(error))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let state = AppState {
        store: NotificationStore::new(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "notification server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/api/notifications/:id",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    debug!("REST request to list notifications");
    Json(state.store.list())
}

async fn get_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Notification>> {
    debug!(id, "REST request to get notification");
    state.store.find(NotificationId(id)).map(Json).ok_or_else(|| {
        reply(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("notification {id} does not exist")),
        )
    })
}

async fn create_notification(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Notification>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    debug!("REST request to create notification");
    if body.is_persisted() {
        return Err(reply(
            StatusCode::BAD_REQUEST,
            ApiError::validation("a new notification cannot already have an id"),
        ));
    }
    let created = state.store.create(body);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Notification>,
) -> ApiResult<Json<Notification>> {
    debug!(id, "REST request to update notification");
    if let Some(body_id) = body.id {
        if body_id.0 != id {
            return Err(reply(
                StatusCode::BAD_REQUEST,
                ApiError::validation("id in body does not match the path"),
            ));
        }
    }
    state
        .store
        .update(NotificationId(id), body)
        .map(Json)
        .ok_or_else(|| {
            reply(
                StatusCode::NOT_FOUND,
                ApiError::not_found(format!("notification {id} does not exist")),
            )
        })
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    debug!(id, "REST request to delete notification");
    if state.store.delete(NotificationId(id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(reply(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("notification {id} does not exist")),
        ))
    }
}
