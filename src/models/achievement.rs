use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub joke_description: Option<String>,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentAchievement {
    pub id: Uuid,
    pub achievement_id: Uuid,
    pub student_id: Uuid,
    pub awarded_by: Uuid,
    pub awarded_at: DateTime<Utc>,
}
