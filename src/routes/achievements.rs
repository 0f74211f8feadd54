use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::achievement_dto::{
    CreateAchievementRequest, RecommendationQuery, UpdateAchievementRequest,
};
use crate::policy::{authorize, Action, Principal};
use crate::services::storage_service::FileKind;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_achievement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateAchievementRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let achievement = state
        .achievement_service
        .create_achievement(&principal, req)
        .await?;
    Ok((StatusCode::CREATED, Json(achievement)).into_response())
}

#[axum::debug_handler]
pub async fn update_achievement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(achievement_id): Path<Uuid>,
    Json(req): Json<UpdateAchievementRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let achievement = state
        .achievement_service
        .update_achievement(&principal, achievement_id, req)
        .await?;
    Ok(Json(achievement).into_response())
}

#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(achievement_id): Path<Uuid>,
    mut multipart: Multipart,
) -> crate::error::Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("photo").to_string();
            let data = field.bytes().await?;
            let url = state
                .storage_service
                .save(FileKind::AchievementPhoto, &filename, &data)
                .await?;
            let achievement = state
                .achievement_service
                .set_photo_url(&principal, achievement_id, &url)
                .await?;
            return Ok(Json(achievement).into_response());
        }
    }
    Err(crate::error::Error::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn delete_achievement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(achievement_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state
        .achievement_service
        .delete_achievement(&principal, achievement_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn award_achievement(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((achievement_id, student_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Response> {
    let awarded = state
        .achievement_service
        .award(&principal, achievement_id, student_id)
        .await?;

    // The award is committed at this point; notification and email are
    // best-effort side effects and never roll it back.
    let achievement = state
        .achievement_service
        .get_achievement_by_id(achievement_id)
        .await?;
    let body = format!("You earned the achievement \"{}\"", achievement.title);
    if let Err(err) = state
        .notification_service
        .notify(student_id, "New achievement", &body)
        .await
    {
        tracing::warn!(achievement_id = %achievement_id, error = %err, "Failed to create award notification");
    }
    if state.mail_service.is_configured() {
        match state.user_service.get_user_by_id(student_id).await {
            Ok(student) => {
                if let Err(err) = state
                    .mail_service
                    .send(&student.email, "New achievement", &body)
                    .await
                {
                    tracing::warn!(achievement_id = %achievement_id, error = %err, "Failed to send award email");
                }
            }
            Err(err) => {
                tracing::warn!(achievement_id = %achievement_id, error = %err, "Failed to load student for award email");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(awarded)).into_response())
}

#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<RecommendationQuery>,
) -> crate::error::Result<Response> {
    // Students may only look up their own recommendations.
    if principal.id != student_id {
        authorize(&principal, Action::AwardAchievements, &[])?;
    }
    let achievements = state
        .achievement_service
        .recommendations(student_id, query.course_id)
        .await?;
    Ok(Json(achievements).into_response())
}

#[axum::debug_handler]
pub async fn list_achievements_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let achievements = state.achievement_service.list_by_course(course_id).await?;
    Ok(Json(achievements).into_response())
}

#[axum::debug_handler]
pub async fn my_awards(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> crate::error::Result<Response> {
    let awards = state
        .achievement_service
        .list_student_awards(principal.id)
        .await?;
    Ok(Json(awards).into_response())
}
