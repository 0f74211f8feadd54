use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::{CreateCourseRequest, UpdateCourseRequest};
use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_course(
        &self,
        principal: &Principal,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        authorize(principal, Action::ManageCourses, &[])?;
        let course = sqlx::query_as::<_, Course>(
            r#"INSERT INTO courses (title, description, methodist_id)
               VALUES ($1, $2, $3) RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.description)
        .bind(principal.id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    pub async fn update_course(
        &self,
        principal: &Principal,
        course_id: Uuid,
        req: UpdateCourseRequest,
    ) -> Result<Course> {
        let course = self.get_course_by_id(course_id).await?;
        authorize(principal, Action::ManageCourses, &[course.methodist_id])?;

        let updated = sqlx::query_as::<_, Course>(
            r#"UPDATE courses
               SET title = COALESCE($1, title),
                   description = COALESCE($2, description),
                   updated_at = NOW()
               WHERE id = $3 RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.description)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn delete_course(&self, principal: &Principal, course_id: Uuid) -> Result<()> {
        let course = self.get_course_by_id(course_id).await?;
        authorize(principal, Action::ManageCourses, &[course.methodist_id])?;

        let activity_count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM activities WHERE course_id = $1"#)
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?;
        if activity_count > 0 {
            return Err(Error::Conflict(
                "Courses with activities cannot be deleted".to_string(),
            ));
        }
        sqlx::query(r#"DELETE FROM courses WHERE id = $1"#)
            .bind(course_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_course_by_id(&self, course_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses ORDER BY title"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
