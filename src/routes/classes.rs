use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::course_dto::{CreateClassRequest, EnrollStudentRequest};
use crate::policy::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_class(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateClassRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let class = state.class_service.create_class(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(class)).into_response())
}

#[axum::debug_handler]
pub async fn delete_class(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(class_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.class_service.delete_class(&principal, class_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn enroll_student(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(class_id): Path<Uuid>,
    Json(req): Json<EnrollStudentRequest>,
) -> crate::error::Result<Response> {
    state
        .class_service
        .enroll_student(&principal, class_id, req.student_id)
        .await?;
    Ok(StatusCode::CREATED.into_response())
}

#[axum::debug_handler]
pub async fn remove_student(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((class_id, student_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Response> {
    state
        .class_service
        .remove_student(&principal, class_id, student_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let students = state.class_service.list_students(class_id).await?;
    Ok(Json(students).into_response())
}

#[axum::debug_handler]
pub async fn list_classes_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let classes = state.class_service.list_classes_by_course(course_id).await?;
    Ok(Json(classes).into_response())
}
