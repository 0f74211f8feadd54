use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::achievement_dto::{CreateAchievementRequest, UpdateAchievementRequest};
use crate::error::{Error, Result};
use crate::models::achievement::{Achievement, StudentAchievement};
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct AchievementService {
    pool: PgPool,
}

impl AchievementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_achievement(
        &self,
        principal: &Principal,
        req: CreateAchievementRequest,
    ) -> Result<Achievement> {
        let methodist_id = self.course_methodist(req.course_id).await?;
        authorize(principal, Action::ManageAchievements, &[methodist_id])?;

        let achievement = sqlx::query_as::<_, Achievement>(
            r#"INSERT INTO achievements (course_id, title, joke_description, description)
               VALUES ($1, $2, $3, $4) RETURNING *"#,
        )
        .bind(req.course_id)
        .bind(req.title)
        .bind(req.joke_description)
        .bind(req.description)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(achievement_id = %achievement.id, "Achievement created");
        Ok(achievement)
    }

    pub async fn update_achievement(
        &self,
        principal: &Principal,
        achievement_id: Uuid,
        req: UpdateAchievementRequest,
    ) -> Result<Achievement> {
        let achievement = self.get_achievement_by_id(achievement_id).await?;
        let methodist_id = self.course_methodist(achievement.course_id).await?;
        authorize(principal, Action::ManageAchievements, &[methodist_id])?;

        let updated = sqlx::query_as::<_, Achievement>(
            r#"UPDATE achievements
               SET title = COALESCE($1, title),
                   joke_description = COALESCE($2, joke_description),
                   description = COALESCE($3, description),
                   updated_at = NOW()
               WHERE id = $4 RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.joke_description)
        .bind(req.description)
        .bind(achievement_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn set_photo_url(
        &self,
        principal: &Principal,
        achievement_id: Uuid,
        url: &str,
    ) -> Result<Achievement> {
        let achievement = self.get_achievement_by_id(achievement_id).await?;
        let methodist_id = self.course_methodist(achievement.course_id).await?;
        authorize(principal, Action::ManageAchievements, &[methodist_id])?;

        let updated = sqlx::query_as::<_, Achievement>(
            r#"UPDATE achievements SET photo_url = $1, updated_at = NOW()
               WHERE id = $2 RETURNING *"#,
        )
        .bind(url)
        .bind(achievement_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn delete_achievement(
        &self,
        principal: &Principal,
        achievement_id: Uuid,
    ) -> Result<()> {
        let achievement = self.get_achievement_by_id(achievement_id).await?;
        let methodist_id = self.course_methodist(achievement.course_id).await?;
        authorize(principal, Action::ManageAchievements, &[methodist_id])?;
        sqlx::query(r#"DELETE FROM achievements WHERE id = $1"#)
            .bind(achievement_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Awards an achievement to a student. A duplicate (student, achievement)
    /// pair fails with Conflict so callers can tell "already awarded" from
    /// "awarded now".
    pub async fn award(
        &self,
        principal: &Principal,
        achievement_id: Uuid,
        student_id: Uuid,
    ) -> Result<StudentAchievement> {
        let achievement = self.get_achievement_by_id(achievement_id).await?;
        let staff = self.course_staff_ids(achievement.course_id).await?;
        authorize(principal, Action::AwardAchievements, &staff)?;

        let student_exists: Option<(Uuid,)> = sqlx::query_as(
            r#"SELECT id FROM users WHERE id = $1 AND role = 'student'"#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        if student_exists.is_none() {
            return Err(Error::NotFound("Student not found".to_string()));
        }

        let awarded = sqlx::query_as::<_, StudentAchievement>(
            r#"INSERT INTO student_achievements (achievement_id, student_id, awarded_by)
               VALUES ($1, $2, $3) RETURNING *"#,
        )
        .bind(achievement_id)
        .bind(student_id)
        .bind(principal.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(
                "This achievement has already been awarded to the student".to_string(),
            ),
            other => other,
        })?;

        tracing::info!(
            achievement_id = %achievement_id,
            student_id = %student_id,
            "Achievement awarded"
        );
        Ok(awarded)
    }

    /// Course achievements the student has not earned yet.
    pub async fn recommendations(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            r#"SELECT a.* FROM achievements a
               WHERE a.course_id = $1
                 AND NOT EXISTS (
                     SELECT 1 FROM student_achievements sa
                     WHERE sa.achievement_id = a.id AND sa.student_id = $2
                 )
               ORDER BY a.title"#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            r#"SELECT * FROM achievements WHERE course_id = $1 ORDER BY title"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_student_awards(&self, student_id: Uuid) -> Result<Vec<StudentAchievement>> {
        let rows = sqlx::query_as::<_, StudentAchievement>(
            r#"SELECT * FROM student_achievements WHERE student_id = $1 ORDER BY awarded_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_achievement_by_id(&self, achievement_id: Uuid) -> Result<Achievement> {
        let achievement =
            sqlx::query_as::<_, Achievement>(r#"SELECT * FROM achievements WHERE id = $1"#)
                .bind(achievement_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(achievement)
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

    async fn course_staff_ids(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        let methodist_id = self.course_methodist(course_id).await?;
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
