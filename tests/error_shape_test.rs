use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use validator::Validate;

use classroom_backend::dto::activity_dto::CreateActivityRequest;
use classroom_backend::error::Error;

async fn not_found_handler() -> classroom_backend::error::Result<&'static str> {
    Err(Error::NotFound("Activity not found".to_string()))
}

async fn conflict_handler() -> classroom_backend::error::Result<&'static str> {
    Err(Error::Conflict(
        "A live attempt already exists for this activity".to_string(),
    ))
}

async fn time_limit_handler() -> classroom_backend::error::Result<&'static str> {
    Err(Error::TimeLimitExceeded(
        "Submission arrived after the time limit".to_string(),
    ))
}

async fn unconfigured_handler() -> classroom_backend::error::Result<&'static str> {
    Err(Error::Unconfigured(
        "Mail delivery is not configured".to_string(),
    ))
}

async fn validated_handler(
    Json(req): Json<CreateActivityRequest>,
) -> classroom_backend::error::Result<&'static str> {
    req.validate()?;
    Ok("ok")
}

fn test_router() -> Router {
    Router::new()
        .route("/health", get(classroom_backend::routes::health::health))
        .route("/not-found", get(not_found_handler))
        .route("/conflict", get(conflict_handler))
        .route("/time-limit", get(time_limit_handler))
        .route("/unconfigured", get(unconfigured_handler))
        .route("/validated", post(validated_handler))
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, JsonValue) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get_json(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn error_body_carries_timestamp_status_and_message() {
    let (status, body) = get_json(test_router(), "/not-found").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Activity not found");
    assert!(body["timestamp"].is_string());
    assert!(body.get("violations").is_none());
}

#[tokio::test]
async fn conflict_maps_to_409() {
    let (status, body) = get_json(test_router(), "/conflict").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn time_limit_maps_to_422() {
    let (status, _) = get_json(test_router(), "/time-limit").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unconfigured_maps_to_503() {
    let (status, _) = get_json(test_router(), "/unconfigured").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn cross_field_violation_names_the_offending_field() {
    let payload = json!({
        "course_id": "7b5c8f3e-1c1f-4f8e-9a44-31a2f3f0a001",
        "lesson_id": "7b5c8f3e-1c1f-4f8e-9a44-31a2f3f0a002",
        "title": "Week of fractions",
        "description": "Practice tasks for the whole week",
        "topic": "Fractions",
        "activity_type": "weekly_star",
        "deadline": "2026-09-07T12:00:00Z"
    });
    let response = test_router()
        .oneshot(
            Request::post("/validated")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: JsonValue = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["message"], "Validation failed");
    let violations = body["violations"].as_array().expect("violations array");
    assert!(violations
        .iter()
        .any(|v| v["field"] == "lesson_id"));
}
