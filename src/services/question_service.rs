use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::activity_dto::UpsertQuestionRequest;
use crate::error::{Error, Result};
use crate::models::activity::ActivityStatus;
use crate::models::question::ActivityQuestion;
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the question at (activity, order_index). The DTO
    /// carries a tagged details variant, so type invariants are already
    /// satisfied when we get here; nothing is written on a rejected request.
    pub async fn upsert_question(
        &self,
        principal: &Principal,
        activity_id: Uuid,
        req: UpsertQuestionRequest,
    ) -> Result<ActivityQuestion> {
        let (status, owners) = self.activity_context(activity_id).await?;
        authorize(principal, Action::ManageQuestions, &owners)?;
        if status == ActivityStatus::Published {
            return Err(Error::Conflict(
                "Questions of a published activity are frozen".to_string(),
            ));
        }

        let question_type = req.details.kind();
        let details = sqlx::types::Json(req.details);

        let question = sqlx::query_as::<_, ActivityQuestion>(
            r#"INSERT INTO activity_questions
               (activity_id, order_index, prompt, points, question_type, details)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (activity_id, order_index)
               DO UPDATE SET prompt = EXCLUDED.prompt,
                             points = EXCLUDED.points,
                             question_type = EXCLUDED.question_type,
                             details = EXCLUDED.details,
                             updated_at = NOW()
               RETURNING *"#,
        )
        .bind(activity_id)
        .bind(req.order_index)
        .bind(req.prompt)
        .bind(req.points)
        .bind(question_type)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            activity_id = %activity_id,
            order_index = question.order_index,
            "Question upserted"
        );
        Ok(question)
    }

    pub async fn delete_question(
        &self,
        principal: &Principal,
        activity_id: Uuid,
        question_id: Uuid,
    ) -> Result<()> {
        let (status, owners) = self.activity_context(activity_id).await?;
        authorize(principal, Action::ManageQuestions, &owners)?;
        if status == ActivityStatus::Published {
            return Err(Error::Conflict(
                "Questions of a published activity are frozen".to_string(),
            ));
        }
        let result = sqlx::query(
            r#"DELETE FROM activity_questions WHERE id = $1 AND activity_id = $2"#,
        )
        .bind(question_id)
        .bind(activity_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Question not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_questions(&self, activity_id: Uuid) -> Result<Vec<ActivityQuestion>> {
        let questions = sqlx::query_as::<_, ActivityQuestion>(
            r#"SELECT * FROM activity_questions WHERE activity_id = $1 ORDER BY order_index"#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn activity_context(&self, activity_id: Uuid) -> Result<(ActivityStatus, Vec<Uuid>)> {
        let row: Option<(ActivityStatus, Uuid)> = sqlx::query_as(
            r#"SELECT a.status, c.methodist_id
               FROM activities a JOIN courses c ON c.id = a.course_id
               WHERE a.id = $1"#,
        )
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some((status, methodist_id)) = row else {
            return Err(Error::NotFound("Activity not found".to_string()));
        };

        let teachers: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT DISTINCT sc.teacher_id
               FROM study_classes sc JOIN activities a ON a.course_id = sc.course_id
               WHERE a.id = $1"#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;

        let mut owners: Vec<Uuid> = teachers.into_iter().map(|t| t.0).collect();
        owners.push(methodist_id);
        Ok((status, owners))
    }
}
