use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::Role;
use crate::policy::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: String,
}

pub fn issue_token(user_id: Uuid, role: Role, ttl_hours: i64) -> crate::error::Result<String> {
    let config = crate::config::get_config();
    let exp = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: role.as_str().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| crate::error::Error::Internal(format!("Failed to issue token: {}", e)))
}

fn decode_principal(token: &str) -> Option<Principal> {
    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()?;
    let id = Uuid::parse_str(&data.claims.sub).ok()?;
    let role = Role::parse(&data.claims.role)?;
    Some(Principal { id, role })
}

fn bearer_token(req: &Request) -> Result<&str, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response());
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response());
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response());
    };
    Ok(token)
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(t) => t.to_string(),
        Err(resp) => return resp,
    };
    match decode_principal(&token) {
        Some(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response(),
    }
}

pub async fn require_roles(mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let token = match bearer_token(&req) {
        Ok(t) => t.to_string(),
        Err(resp) => return resp,
    };
    match decode_principal(&token) {
        Some(principal) => {
            if !allowed.is_empty() && !allowed.contains(&principal.role) {
                return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
            }
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response(),
    }
}

pub async fn require_staff(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Admin, Role::Methodist, Role::Teacher]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Admin]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_config() {
        std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        std::env::set_var("DATABASE_URL", "postgres://localhost/test");
        std::env::set_var("JWT_SECRET", "test_secret_key");
        std::env::set_var("DEFAULT_ADMIN_PASSWORD", "admin_password");
        let _ = crate::config::init_config();
    }

    #[test]
    fn token_roundtrip_preserves_identity_and_role() {
        ensure_config();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Teacher, 1).expect("issue token");
        let principal = decode_principal(&token).expect("decode token");
        assert_eq!(principal.id, user_id);
        assert_eq!(principal.role, Role::Teacher);
    }

    #[test]
    fn expired_token_is_rejected() {
        ensure_config();
        let token = issue_token(Uuid::new_v4(), Role::Student, -1).expect("issue token");
        assert!(decode_principal(&token).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        ensure_config();
        assert!(decode_principal("not.a.jwt").is_none());
    }
}
