use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, RegisterRequest};
use crate::policy::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user = state.auth_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let response = state.auth_service.login(req).await?;
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let user = state.user_service.get_user_by_id(principal.id).await?;
    Ok(Json(user).into_response())
}
