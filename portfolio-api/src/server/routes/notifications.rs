use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use portfolio_store::notify::{Toast, ToastBoard};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_notifications)
        .typed_delete(dismiss_notification)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notifications")]
struct NotificationsPath;

async fn get_notifications(
    _: NotificationsPath,
    State(toasts): State<Arc<ToastBoard>>,
) -> Json<Vec<Toast>> {
    Json(toasts.active())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notifications/{id}", rejection(ServerError))]
struct NotificationPath {
    id: u64,
}

async fn dismiss_notification(
    NotificationPath { id }: NotificationPath,
    State(toasts): State<Arc<ToastBoard>>,
) -> Result<StatusCode> {
    if toasts.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotificationNotFound(id))
    }
}
