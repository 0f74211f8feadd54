use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::{Paginated, Pagination};
use crate::dto::user_dto::{ChangeRoleRequest, UpdateProfileRequest, UserFilter};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        req: UpdateProfileRequest,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users
               SET full_name = COALESCE($1, full_name),
                   email = COALESCE($2, email),
                   updated_at = NOW()
               WHERE id = $3
               RETURNING *"#,
        )
        .bind(req.full_name)
        .bind(req.email)
        .bind(principal.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Email is already taken".to_string()),
            other => other,
        })?;
        Ok(user)
    }

    pub async fn set_avatar_url(&self, user_id: Uuid, url: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users SET avatar_url = $1, updated_at = NOW() WHERE id = $2 RETURNING *"#,
        )
        .bind(url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_users(
        &self,
        principal: &Principal,
        filter: UserFilter,
        pagination: Pagination,
    ) -> Result<Paginated<User>> {
        authorize(principal, Action::ManageUsers, &[])?;
        let (page, per_page) = pagination.clamp();
        let search = filter.search.map(|s| format!("%{}%", s));

        let items = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users
               WHERE ($1::user_role IS NULL OR role = $1)
                 AND ($2::text IS NULL OR username ILIKE $2 OR full_name ILIKE $2 OR email ILIKE $2)
               ORDER BY created_at DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(filter.role)
        .bind(search.clone())
        .bind(per_page)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM users
               WHERE ($1::user_role IS NULL OR role = $1)
                 AND ($2::text IS NULL OR username ILIKE $2 OR full_name ILIKE $2 OR email ILIKE $2)"#,
        )
        .bind(filter.role)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, page, per_page))
    }

    pub async fn change_role(
        &self,
        principal: &Principal,
        user_id: Uuid,
        req: ChangeRoleRequest,
    ) -> Result<User> {
        authorize(principal, Action::ManageUsers, &[])?;
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *"#,
        )
        .bind(req.role)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = %user_id, role = user.role.as_str(), "Role changed");
        Ok(user)
    }

    pub async fn deactivate(&self, principal: &Principal, user_id: Uuid) -> Result<User> {
        authorize(principal, Action::ManageUsers, &[])?;
        if principal.id == user_id {
            return Err(Error::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = %user_id, "User deactivated");
        Ok(user)
    }
}
