use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::course_dto::{CreateCourseRequest, UpdateCourseRequest};
use crate::policy::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateCourseRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let course = state.course_service.create_course(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(course)).into_response())
}

#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<UpdateCourseRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let course = state
        .course_service
        .update_course(&principal, course_id, req)
        .await?;
    Ok(Json(course).into_response())
}

#[axum::debug_handler]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state
        .course_service
        .delete_course(&principal, course_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let course = state.course_service.get_course_by_id(course_id).await?;
    Ok(Json(course).into_response())
}

#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> crate::error::Result<Response> {
    let courses = state.course_service.list_courses().await?;
    Ok(Json(courses).into_response())
}
