use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::PgPool;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::models::user::User;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        let password_hash = hash_password(&req.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (username, email, password_hash, full_name, role)
               VALUES ($1, $2, $3, $4, 'student')
               RETURNING *"#,
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("Username or email is already taken".to_string())
            }
            other => other,
        })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// The login string is resolved as an explicit two-step lookup: email
    /// first, then username. The email match wins when both exist.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let by_email = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(&req.login)
            .fetch_optional(&self.pool)
            .await?;
        let user = match by_email {
            Some(user) => user,
            None => sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
                .bind(&req.login)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?,
        };

        if !user.is_active {
            return Err(Error::Unauthorized("Account is deactivated".to_string()));
        }
        verify_password(&req.password, &user.password_hash)?;

        let config = crate::config::get_config();
        let token = crate::middleware::auth::issue_token(user.id, user.role, config.jwt_ttl_hours)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse { token, user })
    }

    /// One-time startup seed: creates the default admin unless an admin
    /// already exists. Safe to run on every restart.
    pub async fn ensure_default_admin(&self) -> Result<()> {
        let admin_count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE role = 'admin'"#)
                .fetch_one(&self.pool)
                .await?;
        if admin_count > 0 {
            tracing::debug!("Admin account already present, skipping bootstrap");
            return Ok(());
        }

        let config = crate::config::get_config();
        let password_hash = hash_password(&config.default_admin_password)?;
        sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, full_name, role)
               VALUES ($1, $2, $3, 'Administrator', 'admin')
               ON CONFLICT (username) DO NOTHING"#,
        )
        .bind(&config.default_admin_username)
        .bind(&config.default_admin_email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;
        tracing::info!("Default admin account created");
        Ok(())
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Corrupt password hash: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| Error::Unauthorized("Invalid credentials".to_string()))
}
