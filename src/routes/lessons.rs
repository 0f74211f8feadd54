use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::course_dto::{CreateLessonRequest, UpdateLessonRequest};
use crate::policy::Principal;
use crate::services::storage_service::FileKind;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateLessonRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let lesson = state.lesson_service.create_lesson(&principal, req).await?;
    Ok((StatusCode::CREATED, Json(lesson)).into_response())
}

#[axum::debug_handler]
pub async fn update_lesson(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(lesson_id): Path<Uuid>,
    Json(req): Json<UpdateLessonRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let lesson = state
        .lesson_service
        .update_lesson(&principal, lesson_id, req)
        .await?;
    Ok(Json(lesson).into_response())
}

#[axum::debug_handler]
pub async fn upload_presentation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(lesson_id): Path<Uuid>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("presentation").to_string();
            let data = field.bytes().await?;
            let url = state
                .storage_service
                .save(FileKind::Presentation, &filename, &data)
                .await?;
            let lesson = state
                .lesson_service
                .set_presentation_url(&principal, lesson_id, &url)
                .await?;
            return Ok(Json(lesson).into_response());
        }
    }
    Err(crate::error::Error::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(lesson_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.lesson_service.delete_lesson(&principal, lesson_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_lessons_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let lessons = state.lesson_service.list_by_course(course_id).await?;
    Ok(Json(lessons).into_response())
}

#[axum::debug_handler]
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let lesson = state.lesson_service.get_lesson_by_id(lesson_id).await?;
    Ok(Json(lesson).into_response())
}
