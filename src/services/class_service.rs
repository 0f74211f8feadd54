use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::course_dto::CreateClassRequest;
use crate::error::{Error, Result};
use crate::models::study_class::StudyClass;
use crate::models::user::{Role, User};
use crate::policy::{authorize, Action, Principal};

#[derive(Clone)]
pub struct ClassService {
    pool: PgPool,
}

impl ClassService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_class(
        &self,
        principal: &Principal,
        req: CreateClassRequest,
    ) -> Result<StudyClass> {
        let methodist: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT methodist_id FROM courses WHERE id = $1"#)
                .bind(req.course_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((methodist_id,)) = methodist else {
            return Err(Error::NotFound("Course not found".to_string()));
        };
        authorize(principal, Action::ManageClasses, &[methodist_id])?;

        let teacher = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(req.teacher_id)
            .fetch_optional(&self.pool)
            .await?;
        match teacher {
            Some(user) if user.role == Role::Teacher => {}
            Some(_) => {
                return Err(Error::BadRequest(
                    "teacher_id must reference a user with the teacher role".to_string(),
                ))
            }
            None => return Err(Error::NotFound("Teacher not found".to_string())),
        }

        let class = sqlx::query_as::<_, StudyClass>(
            r#"INSERT INTO study_classes (title, course_id, teacher_id)
               VALUES ($1, $2, $3) RETURNING *"#,
        )
        .bind(req.title)
        .bind(req.course_id)
        .bind(req.teacher_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(class_id = %class.id, "Study class created");
        Ok(class)
    }

    pub async fn delete_class(&self, principal: &Principal, class_id: Uuid) -> Result<()> {
        let class = self.get_class_by_id(class_id).await?;
        let owners = self.class_owners(&class).await?;
        authorize(principal, Action::ManageClasses, &owners)?;
        sqlx::query(r#"DELETE FROM study_classes WHERE id = $1"#)
            .bind(class_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn enroll_student(
        &self,
        principal: &Principal,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<()> {
        let class = self.get_class_by_id(class_id).await?;
        let owners = self.class_owners(&class).await?;
        authorize(principal, Action::ManageClasses, &owners)?;

        let student = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        match student {
            Some(user) if user.role == Role::Student => {}
            Some(_) => {
                return Err(Error::BadRequest(
                    "Only students can be enrolled in a class".to_string(),
                ))
            }
            None => return Err(Error::NotFound("Student not found".to_string())),
        }

        sqlx::query(
            r#"INSERT INTO class_students (class_id, student_id) VALUES ($1, $2)"#,
        )
        .bind(class_id)
        .bind(student_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("Student is already enrolled in this class".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    pub async fn remove_student(
        &self,
        principal: &Principal,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<()> {
        let class = self.get_class_by_id(class_id).await?;
        let owners = self.class_owners(&class).await?;
        authorize(principal, Action::ManageClasses, &owners)?;
        let result =
            sqlx::query(r#"DELETE FROM class_students WHERE class_id = $1 AND student_id = $2"#)
                .bind(class_id)
                .bind(student_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "Student is not enrolled in this class".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn list_students(&self, class_id: Uuid) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"SELECT u.* FROM users u
               JOIN class_students cs ON cs.student_id = u.id
               WHERE cs.class_id = $1
               ORDER BY u.full_name"#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_classes_by_course(&self, course_id: Uuid) -> Result<Vec<StudyClass>> {
        let rows = sqlx::query_as::<_, StudyClass>(
            r#"SELECT * FROM study_classes WHERE course_id = $1 ORDER BY title"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_class_by_id(&self, class_id: Uuid) -> Result<StudyClass> {
        let class = sqlx::query_as::<_, StudyClass>(r#"SELECT * FROM study_classes WHERE id = $1"#)
            .bind(class_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(class)
    }

    /// Class mutations are allowed to the class teacher and the course
    /// methodist.
    async fn class_owners(&self, class: &StudyClass) -> Result<Vec<Uuid>> {
        let methodist: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT methodist_id FROM courses WHERE id = $1"#)
                .bind(class.course_id)
                .fetch_optional(&self.pool)
                .await?;
        let mut owners = vec![class.teacher_id];
        if let Some((m,)) = methodist {
            owners.push(m);
        }
        Ok(owners)
    }
}
