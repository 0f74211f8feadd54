use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    HomeworkTest,
    ControlWork,
    WeeklyStar,
    RemedialTask,
}

impl ActivityType {
    /// Weekly and remedial activities target a whole course cohort for a
    /// Monday-aligned week and must not be tied to a lesson.
    pub fn is_weekly(&self) -> bool {
        matches!(self, ActivityType::WeeklyStar | ActivityType::RemedialTask)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub topic: String,
    pub activity_type: ActivityType,
    pub status: ActivityStatus,
    pub deadline: DateTime<Utc>,
    pub time_limit_seconds: Option<i32>,
    pub weight_multiplier: Option<i32>,
    pub assigned_week_start: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
