use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Pagination;
use crate::dto::user_dto::{ChangeRoleRequest, UpdateProfileRequest, UserFilter};
use crate::policy::Principal;
use crate::services::storage_service::FileKind;
use crate::AppState;

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateProfileRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user = state.user_service.update_profile(&principal, req).await?;
    Ok(Json(user).into_response())
}

#[axum::debug_handler]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("avatar").to_string();
            let data = field.bytes().await?;
            let url = state
                .storage_service
                .save(FileKind::Avatar, &filename, &data)
                .await?;
            let user = state.user_service.set_avatar_url(principal.id, &url).await?;
            return Ok(Json(user).into_response());
        }
    }
    Err(crate::error::Error::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<UserFilter>,
    Query(pagination): Query<Pagination>,
) -> crate::error::Result<Response> {
    let page = state
        .user_service
        .list_users(&principal, filter, pagination)
        .await?;
    Ok(Json(page).into_response())
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let user = state.user_service.get_user_by_id(user_id).await?;
    Ok(Json(user).into_response())
}

#[axum::debug_handler]
pub async fn change_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> crate::error::Result<Response> {
    let user = state
        .user_service
        .change_role(&principal, user_id, req)
        .await?;
    Ok(Json(user).into_response())
}

#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let user = state.user_service.deactivate(&principal, user_id).await?;
    Ok(Json(user).into_response())
}
