use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::attempt_dto::{GradeAttemptRequest, SubmitAttemptRequest};
use crate::error::{Error, Result};
use crate::models::activity::{Activity, ActivityStatus, ActivityType};
use crate::models::attempt::{Attempt, AttemptAnswer, AttemptStatus};
use crate::models::question::ActivityQuestion;
use crate::policy::{authorize, Action, Principal};
use crate::services::grading_service::GradingService;
use crate::utils::time::within_time_limit;

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
}

impl AttemptService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Starts a new attempt. At most one live attempt may exist per
    /// (student, activity) pair; the partial unique index backs this up under
    /// concurrent starts. A control-work attempt whose time limit has lapsed
    /// no longer counts as live and is swept to `expired` here.
    pub async fn start_attempt(&self, principal: &Principal, activity_id: Uuid) -> Result<Attempt> {
        authorize(principal, Action::StartAttempt, &[])?;

        let activity = self.fetch_activity(activity_id).await?;
        if activity.status != ActivityStatus::Published {
            return Err(Error::NotFound("Activity not found".to_string()));
        }
        let now = Utc::now();
        if now > activity.deadline {
            return Err(Error::BadRequest(
                "The deadline for this activity has passed".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, Attempt>(
            r#"SELECT * FROM attempts
               WHERE student_id = $1 AND activity_id = $2 AND status = 'in_progress'"#,
        )
        .bind(principal.id)
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(open) = existing {
            let lapsed = matches!(activity.activity_type, ActivityType::ControlWork)
                && activity
                    .time_limit_seconds
                    .map(|limit| !within_time_limit(open.started_at, limit, now))
                    .unwrap_or(false);
            if !lapsed {
                return Err(Error::Conflict(
                    "A live attempt already exists for this activity".to_string(),
                ));
            }
            sqlx::query(
                r#"UPDATE attempts SET status = 'expired', submitted_at = $1, updated_at = $1
                   WHERE id = $2"#,
            )
            .bind(now)
            .bind(open.id)
            .execute(&self.pool)
            .await?;
            tracing::info!(attempt_id = %open.id, "Swept lapsed control-work attempt to expired");
        }

        let attempt = sqlx::query_as::<_, Attempt>(
            r#"INSERT INTO attempts (activity_id, student_id, status, started_at)
               VALUES ($1, $2, 'in_progress', $3)
               RETURNING *"#,
        )
        .bind(activity_id)
        .bind(principal.id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(
                "A live attempt already exists for this activity".to_string(),
            ),
            other => other,
        })?;

        tracing::info!(attempt_id = %attempt.id, activity_id = %activity_id, "Attempt started");
        Ok(attempt)
    }

    /// Submits the full answer sheet. Auto-gradable questions are scored
    /// immediately; a control-work submission past its time limit marks the
    /// attempt `expired` and fails with TimeLimitExceeded. Submission at
    /// exactly the limit is accepted.
    pub async fn submit_attempt(
        &self,
        principal: &Principal,
        attempt_id: Uuid,
        req: SubmitAttemptRequest,
    ) -> Result<(Attempt, Vec<AttemptAnswer>)> {
        let attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.student_id != principal.id {
            return Err(Error::Forbidden(
                "Only the owning student may submit this attempt".to_string(),
            ));
        }
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::Conflict(
                "Attempt has already been submitted".to_string(),
            ));
        }

        let activity = self.fetch_activity(attempt.activity_id).await?;
        let now = Utc::now();
        if activity.activity_type == ActivityType::ControlWork {
            if let Some(limit) = activity.time_limit_seconds {
                if !within_time_limit(attempt.started_at, limit, now) {
                    sqlx::query(
                        r#"UPDATE attempts SET status = 'expired', submitted_at = $1, updated_at = $1
                           WHERE id = $2"#,
                    )
                    .bind(now)
                    .bind(attempt_id)
                    .execute(&self.pool)
                    .await?;
                    tracing::warn!(attempt_id = %attempt_id, "Submission past time limit, attempt expired");
                    return Err(Error::TimeLimitExceeded(
                        "Submission arrived after the time limit".to_string(),
                    ));
                }
            }
        }

        let questions = self.fetch_questions(attempt.activity_id).await?;
        let outcome = GradingService::grade(&questions, &req.answers)?;

        let score = Decimal::from(outcome.auto_score);
        let max_score = Decimal::from(outcome.total_max);
        let auto_max = Decimal::from(outcome.auto_max);
        let percent = GradingService::percent(score, auto_max);

        let mut tx = self.pool.begin().await?;
        for answer in &outcome.answers {
            sqlx::query(
                r#"INSERT INTO attempt_answers
                   (attempt_id, question_id, selected_option, text_answer, is_correct, points_awarded, max_points)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(answer.selected_option)
            .bind(answer.text_answer.as_deref())
            .bind(answer.is_correct)
            .bind(answer.points_awarded)
            .bind(answer.max_points)
            .execute(&mut *tx)
            .await?;
        }
        let updated = sqlx::query_as::<_, Attempt>(
            r#"UPDATE attempts
               SET status = 'submitted', submitted_at = $1, score = $2, max_score = $3,
                   percent = $4, updated_at = $1
               WHERE id = $5
               RETURNING *"#,
        )
        .bind(now)
        .bind(score)
        .bind(max_score)
        .bind(percent)
        .bind(attempt_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            attempt_id = %attempt_id,
            score = %score,
            needs_review = outcome.needs_review,
            "Attempt submitted"
        );
        let answers = self.fetch_answers(attempt_id).await?;
        Ok((updated, answers))
    }

    /// Manual grading: awards points for open answers, recomputes the percent
    /// over the full point total, and moves the attempt to its terminal state.
    pub async fn grade_attempt(
        &self,
        principal: &Principal,
        attempt_id: Uuid,
        req: GradeAttemptRequest,
    ) -> Result<Attempt> {
        let mut seen = std::collections::HashSet::new();
        for award in &req.awards {
            if !seen.insert(award.question_id) {
                return Err(Error::BadRequest(format!(
                    "Duplicate award for question {}",
                    award.question_id
                )));
            }
        }

        let attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.status != AttemptStatus::Submitted {
            return Err(Error::Conflict(
                "Only submitted attempts can be graded".to_string(),
            ));
        }

        let activity = self.fetch_activity(attempt.activity_id).await?;
        let staff = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::GradeAttempts, &staff)?;

        let answers = self.fetch_answers(attempt_id).await?;
        let mut awarded: Vec<(Uuid, i32, bool)> = Vec::new();
        for answer in answers.iter().filter(|a| a.points_awarded.is_none()) {
            let Some(award) = req.awards.iter().find(|w| w.question_id == answer.question_id)
            else {
                return Err(Error::BadRequest(format!(
                    "Missing award for open question {}",
                    answer.question_id
                )));
            };
            if award.points_awarded < 0 || award.points_awarded > answer.max_points {
                return Err(Error::BadRequest(format!(
                    "Award for question {} must be between 0 and {}",
                    answer.question_id, answer.max_points
                )));
            }
            awarded.push((
                answer.question_id,
                award.points_awarded,
                award.points_awarded == answer.max_points,
            ));
        }
        for award in &req.awards {
            let known = answers
                .iter()
                .any(|a| a.question_id == award.question_id && a.points_awarded.is_none());
            if !known {
                return Err(Error::BadRequest(format!(
                    "Award references a question that needs no manual grading: {}",
                    award.question_id
                )));
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for (question_id, points, correct) in &awarded {
            sqlx::query(
                r#"UPDATE attempt_answers SET points_awarded = $1, is_correct = $2
                   WHERE attempt_id = $3 AND question_id = $4"#,
            )
            .bind(points)
            .bind(correct)
            .bind(attempt_id)
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        }

        let (total, max_total) = self.answer_totals(&mut tx, attempt_id).await?;
        let score = Decimal::from(total);
        let max_score = Decimal::from(max_total);
        let percent = GradingService::percent(score, max_score);

        let updated = sqlx::query_as::<_, Attempt>(
            r#"UPDATE attempts
               SET status = 'graded', graded_at = $1, graded_by = $2, score = $3,
                   max_score = $4, percent = $5, updated_at = $1
               WHERE id = $6
               RETURNING *"#,
        )
        .bind(now)
        .bind(principal.id)
        .bind(score)
        .bind(max_score)
        .bind(percent)
        .bind(attempt_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(attempt_id = %attempt_id, percent = %percent, "Attempt graded");
        Ok(updated)
    }

    pub async fn get_attempt(
        &self,
        principal: &Principal,
        attempt_id: Uuid,
    ) -> Result<(Attempt, Vec<AttemptAnswer>)> {
        let attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.student_id != principal.id {
            let activity = self.fetch_activity(attempt.activity_id).await?;
            let staff = self.course_staff_ids(activity.course_id).await?;
            authorize(principal, Action::GradeAttempts, &staff)?;
        }
        let answers = self.fetch_answers(attempt_id).await?;
        Ok((attempt, answers))
    }

    pub async fn list_student_attempts(&self, student_id: Uuid) -> Result<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, Attempt>(
            r#"SELECT * FROM attempts WHERE student_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_activity_attempts(
        &self,
        principal: &Principal,
        activity_id: Uuid,
    ) -> Result<Vec<Attempt>> {
        let activity = self.fetch_activity(activity_id).await?;
        let staff = self.course_staff_ids(activity.course_id).await?;
        authorize(principal, Action::GradeAttempts, &staff)?;
        let rows = sqlx::query_as::<_, Attempt>(
            r#"SELECT * FROM attempts WHERE activity_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn answer_totals(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        attempt_id: Uuid,
    ) -> Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            r#"SELECT COALESCE(SUM(points_awarded), 0)::bigint, COALESCE(SUM(max_points), 0)::bigint
               FROM attempt_answers WHERE attempt_id = $1"#,
        )
        .bind(attempt_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    async fn fetch_attempt(&self, attempt_id: Uuid) -> Result<Attempt> {
        let attempt = sqlx::query_as::<_, Attempt>(r#"SELECT * FROM attempts WHERE id = $1"#)
            .bind(attempt_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(attempt)
    }

    async fn fetch_activity(&self, activity_id: Uuid) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(r#"SELECT * FROM activities WHERE id = $1"#)
            .bind(activity_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn fetch_questions(&self, activity_id: Uuid) -> Result<Vec<ActivityQuestion>> {
        let questions = sqlx::query_as::<_, ActivityQuestion>(
            r#"SELECT * FROM activity_questions WHERE activity_id = $1 ORDER BY order_index"#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn fetch_answers(&self, attempt_id: Uuid) -> Result<Vec<AttemptAnswer>> {
        let answers = sqlx::query_as::<_, AttemptAnswer>(
            r#"SELECT aa.* FROM attempt_answers aa
               JOIN activity_questions q ON q.id = aa.question_id
               WHERE aa.attempt_id = $1
               ORDER BY q.order_index"#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    /// Users allowed to grade/inspect attempts of a course: its methodist and
    /// the teachers of its classes.
    async fn course_staff_ids(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        let methodist: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT methodist_id FROM courses WHERE id = $1"#)
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        let teachers: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT DISTINCT teacher_id FROM study_classes WHERE course_id = $1"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ids: Vec<Uuid> = teachers.into_iter().map(|t| t.0).collect();
        if let Some((m,)) = methodist {
            ids.push(m);
        }
        Ok(ids)
    }
}
