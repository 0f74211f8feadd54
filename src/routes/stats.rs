use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;

use crate::policy::{authorize, Action, Principal};
use crate::AppState;

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let stats = state.stats_service.dashboard(&principal).await?;
    Ok(Json(stats).into_response())
}

#[axum::debug_handler]
pub async fn activity_stats(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let stats = state
        .stats_service
        .activity_stats(&principal, activity_id)
        .await?;
    Ok(Json(stats).into_response())
}

/// A student's own progress in a course.
#[axum::debug_handler]
pub async fn my_course_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let progress = state
        .stats_service
        .student_course_progress(principal.id, course_id)
        .await?;
    Ok(Json(progress).into_response())
}

/// Staff view of any student's progress in a course.
#[axum::debug_handler]
pub async fn student_course_progress(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Response> {
    authorize(&principal, Action::ViewStats, &[])?;
    let progress = state
        .stats_service
        .student_course_progress(student_id, course_id)
        .await?;
    Ok(Json(progress).into_response())
}
