use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct StatsService {
    pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub users_by_role: HashMap<String, i64>,
    pub activities_by_status: HashMap<String, i64>,
    pub attempts_by_status: HashMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityStats {
    pub activity_id: Uuid,
    pub attempts_by_status: HashMap<String, i64>,
    pub average_percent: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct StudentCourseProgress {
    pub course_id: Uuid,
    pub published_activities: i64,
    pub graded_attempts: i64,
    pub average_percent: Option<Decimal>,
    pub achievements_earned: i64,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self, principal: &Principal) -> Result<DashboardStats> {
        authorize(principal, Action::ViewStats, &[])?;
        Ok(DashboardStats {
            users_by_role: self
                .distribution("SELECT role::text, COUNT(*) FROM users GROUP BY role")
                .await?,
            activities_by_status: self
                .distribution("SELECT status::text, COUNT(*) FROM activities GROUP BY status")
                .await?,
            attempts_by_status: self
                .distribution("SELECT status::text, COUNT(*) FROM attempts GROUP BY status")
                .await?,
        })
    }

    pub async fn activity_stats(
        &self,
        principal: &Principal,
        activity_id: Uuid,
    ) -> Result<ActivityStats> {
        authorize(principal, Action::ViewStats, &[])?;

        let rows = sqlx::query(
            r#"SELECT status::text AS status, COUNT(*) AS count
               FROM attempts WHERE activity_id = $1 GROUP BY status"#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        let mut attempts_by_status = HashMap::new();
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            attempts_by_status.insert(status, count);
        }

        let average_percent: Option<Decimal> = sqlx::query_scalar(
            r#"SELECT AVG(percent) FROM attempts
               WHERE activity_id = $1 AND status = 'graded'"#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ActivityStats {
            activity_id,
            attempts_by_status,
            average_percent: average_percent.map(|p| p.round_dp(2)),
        })
    }

    pub async fn student_course_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<StudentCourseProgress> {
        let published_activities: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM activities WHERE course_id = $1 AND status = 'published'"#,
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        let graded_attempts: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM attempts at
               JOIN activities a ON a.id = at.activity_id
               WHERE at.student_id = $1 AND a.course_id = $2 AND at.status = 'graded'"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        let average_percent: Option<Decimal> = sqlx::query_scalar(
            r#"SELECT AVG(at.percent) FROM attempts at
               JOIN activities a ON a.id = at.activity_id
               WHERE at.student_id = $1 AND a.course_id = $2 AND at.status = 'graded'"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        let achievements_earned: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM student_achievements sa
               JOIN achievements a ON a.id = sa.achievement_id
               WHERE sa.student_id = $1 AND a.course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StudentCourseProgress {
            course_id,
            published_activities,
            graded_attempts,
            average_percent: average_percent.map(|p| p.round_dp(2)),
            achievements_earned,
        })
    }

    async fn distribution(&self, query: &str) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let mut map = HashMap::new();
        for row in rows {
            let key: String = row.try_get(0)?;
            let count: i64 = row.try_get(1)?;
            map.insert(key, count);
        }
        Ok(map)
    }
}
