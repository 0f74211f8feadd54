use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::policy::Principal;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<NotificationQuery>,
) -> crate::error::Result<Response> {
    let notifications = state
        .notification_service
        .list_for_user(principal.id, query.unread_only)
        .await?;
    Ok(Json(notifications).into_response())
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(notification_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state
        .notification_service
        .mark_read(principal.id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let updated = state
        .notification_service
        .mark_all_read(principal.id)
        .await?;
    Ok(Json(json!({ "updated": updated })).into_response())
}
