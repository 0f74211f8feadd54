use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAchievementRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 127))]
    pub title: String,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(max = 512))]
    pub joke_description: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAchievementRequest {
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(max = 512))]
    pub joke_description: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 2048))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationQuery {
    pub course_id: Uuid,
}
