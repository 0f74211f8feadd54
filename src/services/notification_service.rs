use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::notification::Notification;

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn notify(&self, user_id: Uuid, title: &str, body: &str) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications (user_id, title, body)
               VALUES ($1, $2, $3) RETURNING *"#,
        )
        .bind(user_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"SELECT * FROM notifications
               WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2"#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(crate::error::Error::NotFound(
                "Notification not found".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
