use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::activity_dto::{
    CreateActivityRequest, UpdateActivityRequest, WeeklyActivityAssignRequest,
};
use crate::error::{Error, Result};
use crate::models::activity::{Activity, ActivityStatus};
use crate::models::user::Role;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct ActivityService {
    pool: PgPool,
}

impl ActivityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_activity(
        &self,
        principal: &Principal,
        req: CreateActivityRequest,
    ) -> Result<Activity> {
        let owners = self.course_staff_ids(req.course_id).await?;
        authorize(principal, Action::ManageActivities, &owners)?;

        if let Some(lesson_id) = req.lesson_id {
            let belongs: Option<(Uuid,)> = sqlx::query_as(
                r#"SELECT id FROM lessons WHERE id = $1 AND course_id = $2"#,
            )
            .bind(lesson_id)
            .bind(req.course_id)
            .fetch_optional(&self.pool)
            .await?;
            if belongs.is_none() {
                return Err(Error::BadRequest(
                    "lesson_id does not belong to the given course".to_string(),
                ));
            }
        }

        let activity = sqlx::query_as::<_, Activity>(
            r#"INSERT INTO activities
               (course_id, lesson_id, title, description, topic, activity_type, status,
                deadline, time_limit_seconds, weight_multiplier, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, 'draft', $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(req.course_id)
        .bind(req.lesson_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.topic)
        .bind(req.activity_type)
        .bind(req.deadline)
        .bind(req.time_limit_seconds)
        .bind(req.weight_multiplier)
        .bind(principal.id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(activity_id = %activity.id, "Activity created");
        Ok(activity)
    }

    pub async fn update_activity(
        &self,
        principal: &Principal,
        activity_id: Uuid,
        req: UpdateActivityRequest,
    ) -> Result<Activity> {
        let activity = self.get_activity_by_id(activity_id).await?;
        let owners = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::ManageActivities, &owners)?;

        if activity.status == ActivityStatus::Published {
            return Err(Error::Conflict(
                "Published activities cannot be edited".to_string(),
            ));
        }
        if req.time_limit_seconds.is_some()
            && activity.activity_type != crate::models::activity::ActivityType::ControlWork
        {
            return Err(Error::BadRequest(
                "time_limit_seconds is only allowed for control_work".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Activity>(
            r#"UPDATE activities
               SET title = COALESCE($1, title),
                   description = COALESCE($2, description),
                   topic = COALESCE($3, topic),
                   deadline = COALESCE($4, deadline),
                   time_limit_seconds = COALESCE($5, time_limit_seconds),
                   weight_multiplier = COALESCE($6, weight_multiplier),
                   updated_at = NOW()
               WHERE id = $7
               RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.description)
        .bind(req.topic)
        .bind(req.deadline)
        .bind(req.time_limit_seconds)
        .bind(req.weight_multiplier)
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Draft → published. Requires at least one question.
    pub async fn publish_activity(
        &self,
        principal: &Principal,
        activity_id: Uuid,
    ) -> Result<Activity> {
        let activity = self.get_activity_by_id(activity_id).await?;
        let owners = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::ManageActivities, &owners)?;

        if activity.status == ActivityStatus::Published {
            return Err(Error::Conflict("Activity is already published".to_string()));
        }
        let question_count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM activity_questions WHERE activity_id = $1"#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        if question_count == 0 {
            return Err(Error::BadRequest(
                "An activity needs at least one question before publishing".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Activity>(
            r#"UPDATE activities SET status = 'published', updated_at = NOW()
               WHERE id = $1 RETURNING *"#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(activity_id = %activity_id, "Activity published");
        Ok(updated)
    }

    /// Assigns a weekly/remedial activity to a Monday-aligned week. The DTO
    /// already guarantees the Monday invariant.
    pub async fn assign_week(
        &self,
        principal: &Principal,
        activity_id: Uuid,
        req: WeeklyActivityAssignRequest,
    ) -> Result<Activity> {
        let activity = self.get_activity_by_id(activity_id).await?;
        let owners = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::ManageActivities, &owners)?;

        if !activity.activity_type.is_weekly() {
            return Err(Error::BadRequest(
                "Only weekly_star and remedial_task activities can be assigned to a week"
                    .to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Activity>(
            r#"UPDATE activities SET assigned_week_start = $1, updated_at = NOW()
               WHERE id = $2 RETURNING *"#,
        )
        .bind(req.week_start)
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(activity_id = %activity_id, week_start = %req.week_start, "Weekly assignment set");
        Ok(updated)
    }

    pub async fn delete_activity(&self, principal: &Principal, activity_id: Uuid) -> Result<()> {
        let activity = self.get_activity_by_id(activity_id).await?;
        let owners = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::ManageActivities, &owners)?;

        if activity.status != ActivityStatus::Draft {
            return Err(Error::Conflict(
                "Only draft activities can be deleted".to_string(),
            ));
        }
        sqlx::query(r#"DELETE FROM activities WHERE id = $1"#)
            .bind(activity_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Students only see published activities; staff see everything.
    pub async fn list_by_course(
        &self,
        principal: &Principal,
        course_id: Uuid,
    ) -> Result<Vec<Activity>> {
        authorize(principal, Action::ViewPublishedContent, &[])?;
        let published_only = principal.role == Role::Student;
        let rows = sqlx::query_as::<_, Activity>(
            r#"SELECT * FROM activities
               WHERE course_id = $1 AND ($2 = FALSE OR status = 'published')
               ORDER BY created_at DESC"#,
        )
        .bind(course_id)
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_activity_by_id(&self, activity_id: Uuid) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(r#"SELECT * FROM activities WHERE id = $1"#)
            .bind(activity_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn course_staff_ids(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        let methodist: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT methodist_id FROM courses WHERE id = $1"#)
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((methodist_id,)) = methodist else {
            return Err(Error::NotFound("Course not found".to_string()));
        };
        let teachers: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT DISTINCT teacher_id FROM study_classes WHERE course_id = $1"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ids: Vec<Uuid> = teachers.into_iter().map(|t| t.0).collect();
        ids.push(methodist_id);
        Ok(ids)
    }
}
