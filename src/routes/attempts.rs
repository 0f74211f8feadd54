use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{AttemptResultResponse, GradeAttemptRequest, SubmitAttemptRequest};
use crate::policy::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let attempt = state
        .attempt_service
        .start_attempt(&principal, activity_id)
        .await?;
    Ok((StatusCode::CREATED, Json(attempt)).into_response())
}

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let (attempt, answers) = state
        .attempt_service
        .submit_attempt(&principal, attempt_id, req)
        .await?;
    Ok(Json(AttemptResultResponse { attempt, answers }).into_response())
}

#[axum::debug_handler]
pub async fn grade_attempt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<GradeAttemptRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let attempt = state
        .attempt_service
        .grade_attempt(&principal, attempt_id, req)
        .await?;

    // Notify the student about the final score. Grading already committed, so
    // a failed notification is logged instead of surfacing an error.
    let body = match attempt.percent {
        Some(percent) => format!("Your attempt has been graded: {percent}%"),
        None => "Your attempt has been graded".to_string(),
    };
    if let Err(err) = state
        .notification_service
        .notify(attempt.student_id, "Attempt graded", &body)
        .await
    {
        tracing::warn!(attempt_id = %attempt.id, error = %err, "Failed to notify student about grading");
    }

    Ok(Json(attempt).into_response())
}

#[axum::debug_handler]
pub async fn get_attempt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (attempt, answers) = state
        .attempt_service
        .get_attempt(&principal, attempt_id)
        .await?;
    Ok(Json(AttemptResultResponse { attempt, answers }).into_response())
}

#[axum::debug_handler]
pub async fn my_attempts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let attempts = state
        .attempt_service
        .list_student_attempts(principal.id)
        .await?;
    Ok(Json(attempts).into_response())
}

#[axum::debug_handler]
pub async fn list_activity_attempts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let attempts = state
        .attempt_service
        .list_activity_attempts(&principal, activity_id)
        .await?;
    Ok(Json(attempts).into_response())
}
