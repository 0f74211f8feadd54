use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::activity_dto::{
    CreateActivityRequest, UpdateActivityRequest, UpsertQuestionRequest,
    WeeklyActivityAssignRequest,
};
use crate::models::activity::ActivityStatus;
use crate::models::question::QuestionView;
use crate::models::user::Role;
use crate::policy::Principal;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateActivityRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let activity = state
        .activity_service
        .create_activity(&principal, req)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)).into_response())
}

#[axum::debug_handler]
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<UpdateActivityRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let activity = state
        .activity_service
        .update_activity(&principal, activity_id, req)
        .await?;
    Ok(Json(activity).into_response())
}

#[axum::debug_handler]
pub async fn publish_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let activity = state
        .activity_service
        .publish_activity(&principal, activity_id)
        .await?;
    Ok(Json(activity).into_response())
}

#[axum::debug_handler]
pub async fn assign_week(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<WeeklyActivityAssignRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let activity = state
        .activity_service
        .assign_week(&principal, activity_id, req)
        .await?;
    Ok(Json(activity).into_response())
}

#[axum::debug_handler]
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state
        .activity_service
        .delete_activity(&principal, activity_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_activities_by_course(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let activities = state
        .activity_service
        .list_by_course(&principal, course_id)
        .await?;
    Ok(Json(activities).into_response())
}

#[axum::debug_handler]
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let activity = state.activity_service.get_activity_by_id(activity_id).await?;
    // Drafts are invisible to students.
    if principal.role == Role::Student && activity.status != ActivityStatus::Published {
        return Err(crate::error::Error::NotFound(
            "Activity not found".to_string(),
        ));
    }
    Ok(Json(activity).into_response())
}

#[axum::debug_handler]
pub async fn upsert_question(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<UpsertQuestionRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let question = state
        .question_service
        .upsert_question(&principal, activity_id, req)
        .await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((activity_id, question_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Response> {
    state
        .question_service
        .delete_question(&principal, activity_id, question_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(activity_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    if principal.role == Role::Student {
        let activity = state.activity_service.get_activity_by_id(activity_id).await?;
        if activity.status != ActivityStatus::Published {
            return Err(crate::error::Error::NotFound(
                "Activity not found".to_string(),
            ));
        }
        // Students never see the answer key.
        let questions = state.question_service.list_questions(activity_id).await?;
        let views: Vec<QuestionView> = questions.iter().map(QuestionView::from).collect();
        return Ok(Json(views).into_response());
    }
    let questions = state.question_service.list_questions(activity_id).await?;
    Ok(Json(questions).into_response())
}
