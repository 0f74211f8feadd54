use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 127))]
    pub title: String,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 127))]
    pub title: String,
    pub course_id: Uuid,
    pub teacher_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollStudentRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLessonRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 127))]
    pub title: String,
    #[validate(length(min = 1, max = 127))]
    pub topic: String,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    pub content: Option<String>,
    #[validate(range(min = 1))]
    pub order_index: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLessonRequest {
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    pub content: Option<String>,
    #[validate(range(min = 1))]
    pub order_index: Option<i32>,
}
