use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::{CreateLessonRequest, UpdateLessonRequest};
use crate::error::{Error, Result};
use crate::models::lesson::Lesson;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct LessonService {
    pool: PgPool,
}

impl LessonService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_lesson(
        &self,
        principal: &Principal,
        req: CreateLessonRequest,
    ) -> Result<Lesson> {
        let methodist_id = self.course_methodist(req.course_id).await?;
        authorize(principal, Action::ManageLessons, &[methodist_id])?;

        let lesson = sqlx::query_as::<_, Lesson>(
            r#"INSERT INTO lessons (course_id, title, topic, content, order_index)
               VALUES ($1, $2, $3, $4, $5) RETURNING *"#,
        )
        .bind(req.course_id)
        .bind(req.title)
        .bind(req.topic)
        .bind(req.content)
        .bind(req.order_index)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(lesson_id = %lesson.id, "Lesson created");
        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        principal: &Principal,
        lesson_id: Uuid,
        req: UpdateLessonRequest,
    ) -> Result<Lesson> {
        let lesson = self.get_lesson_by_id(lesson_id).await?;
        let methodist_id = self.course_methodist(lesson.course_id).await?;
        authorize(principal, Action::ManageLessons, &[methodist_id])?;

        let updated = sqlx::query_as::<_, Lesson>(
            r#"UPDATE lessons
               SET title = COALESCE($1, title),
                   topic = COALESCE($2, topic),
                   content = COALESCE($3, content),
                   order_index = COALESCE($4, order_index),
                   updated_at = NOW()
               WHERE id = $5 RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.topic)
        .bind(req.content)
        .bind(req.order_index)
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn set_presentation_url(
        &self,
        principal: &Principal,
        lesson_id: Uuid,
        url: &str,
    ) -> Result<Lesson> {
        let lesson = self.get_lesson_by_id(lesson_id).await?;
        let methodist_id = self.course_methodist(lesson.course_id).await?;
        authorize(principal, Action::ManageLessons, &[methodist_id])?;

        let updated = sqlx::query_as::<_, Lesson>(
            r#"UPDATE lessons SET presentation_url = $1, updated_at = NOW()
               WHERE id = $2 RETURNING *"#,
        )
        .bind(url)
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn delete_lesson(&self, principal: &Principal, lesson_id: Uuid) -> Result<()> {
        let lesson = self.get_lesson_by_id(lesson_id).await?;
        let methodist_id = self.course_methodist(lesson.course_id).await?;
        authorize(principal, Action::ManageLessons, &[methodist_id])?;

        let attached: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM activities WHERE lesson_id = $1"#)
                .bind(lesson_id)
                .fetch_one(&self.pool)
                .await?;
        if attached > 0 {
            return Err(Error::Conflict(
                "Lessons with attached activities cannot be deleted".to_string(),
            ));
        }
        sqlx::query(r#"DELETE FROM lessons WHERE id = $1"#)
            .bind(lesson_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Lesson>> {
        let rows = sqlx::query_as::<_, Lesson>(
            r#"SELECT * FROM lessons WHERE course_id = $1 ORDER BY order_index"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_lesson_by_id(&self, lesson_id: Uuid) -> Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(r#"SELECT * FROM lessons WHERE id = $1"#)
            .bind(lesson_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(lesson)
    }

    async fn course_methodist(&self, course_id: Uuid) -> Result<Uuid> {
        let row: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT methodist_id FROM courses WHERE id = $1"#)
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| r.0)
            .ok_or_else(|| Error::NotFound("Course not found".to_string()))
    }
}
