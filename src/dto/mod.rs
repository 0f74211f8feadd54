pub mod achievement_dto;
pub mod activity_dto;
pub mod attempt_dto;
pub mod auth_dto;
pub mod common;
pub mod course_dto;
pub mod user_dto;

// Custom deserializer to trim strings and convert empty strings to None
pub(crate) fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
