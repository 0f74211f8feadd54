use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Time limit exceeded: {0}")]
    TimeLimitExceeded(String),

    #[error("Not configured: {0}")]
    Unconfigured(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message, violations) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            Error::TimeLimitExceeded(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            Error::Unconfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
            Error::Validation(errs) => {
                let violations = field_violations(&errs);
                (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    Some(violations),
                )
            }
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            Error::Database(_) | Error::Io(_) | Error::Internal(_) | Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
                None,
            ),
        };

        let mut body = json!({
            "timestamp": Utc::now(),
            "status": status.as_u16(),
            "message": message,
        });
        if let Some(violations) = violations {
            body["violations"] = violations;
        }
        (status, Json(body)).into_response()
    }
}

fn field_violations(errs: &validator::ValidationErrors) -> serde_json::Value {
    let mut out = Vec::new();
    for (field, kind) in errs.errors() {
        if let validator::ValidationErrorsKind::Field(field_errs) = kind {
            for err in field_errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                // Struct-level validators report under "__all__"; their code
                // names the offending field.
                let field: &str = if *field == "__all__" {
                    err.code.as_ref()
                } else {
                    field
                };
                out.push(json!({ "field": field, "message": message }));
            }
        }
    }
    json!(out)
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("Resource already exists".to_string())
            }
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_maps_to_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn unexpected_sqlx_errors_stay_internal() {
        let err = Error::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, Error::Database(_)));
    }
}
