use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::activity::ActivityType;
use crate::models::question::QuestionDetails;

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_activity_cross_fields"))]
pub struct CreateActivityRequest {
    pub course_id: Uuid,
    pub lesson_id: Option<Uuid>,
    #[validate(length(min = 1, max = 127))]
    pub title: String,
    #[validate(length(min = 1, max = 2048), custom(function = "non_blank"))]
    pub description: String,
    #[validate(length(min = 1, max = 127))]
    pub topic: String,
    pub activity_type: ActivityType,
    pub deadline: DateTime<Utc>,
    #[validate(range(min = 1, max = 86400))]
    pub time_limit_seconds: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub weight_multiplier: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 2048))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::trim_optional_string")]
    #[validate(length(min = 1, max = 127))]
    pub topic: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 86400))]
    pub time_limit_seconds: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub weight_multiplier: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WeeklyActivityAssignRequest {
    #[validate(custom(function = "week_start_is_monday"))]
    pub week_start: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertQuestionRequest {
    #[validate(range(min = 1))]
    pub order_index: i32,
    #[validate(length(min = 1, max = 2048))]
    pub prompt: String,
    #[validate(range(min = 1))]
    pub points: i32,
    #[serde(flatten)]
    #[validate(custom(function = "question_details"))]
    pub details: QuestionDetails,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("non_blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn week_start_is_monday(date: &NaiveDate) -> Result<(), ValidationError> {
    if !crate::utils::time::is_week_start(*date) {
        let mut err = ValidationError::new("week_start");
        err.message = Some("week_start must fall on a Monday".into());
        return Err(err);
    }
    Ok(())
}

fn question_details(details: &QuestionDetails) -> Result<(), ValidationError> {
    details.check().map_err(|msg| {
        let mut err = ValidationError::new("details");
        err.message = Some(msg.into());
        err
    })
}

fn validate_activity_cross_fields(req: &CreateActivityRequest) -> Result<(), ValidationError> {
    if req.activity_type.is_weekly() && req.lesson_id.is_some() {
        let mut err = ValidationError::new("lesson_id");
        err.message =
            Some("weekly_star and remedial_task activities must not reference a lesson".into());
        return Err(err);
    }
    if req.time_limit_seconds.is_some() && req.activity_type != ActivityType::ControlWork {
        let mut err = ValidationError::new("time_limit_seconds");
        err.message = Some("time_limit_seconds is only allowed for control_work".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_request(activity_type: ActivityType) -> CreateActivityRequest {
        CreateActivityRequest {
            course_id: Uuid::new_v4(),
            lesson_id: None,
            title: "Fractions homework".into(),
            description: "Solve all ten exercises".into(),
            topic: "Fractions".into(),
            activity_type,
            deadline: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap(),
            time_limit_seconds: None,
            weight_multiplier: None,
        }
    }

    #[test]
    fn weekly_activity_rejects_lesson() {
        let mut req = base_request(ActivityType::WeeklyStar);
        req.lesson_id = Some(Uuid::new_v4());
        assert!(req.validate().is_err());
        req.lesson_id = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn time_limit_only_for_control_work() {
        let mut req = base_request(ActivityType::HomeworkTest);
        req.time_limit_seconds = Some(1800);
        assert!(req.validate().is_err());
        req.activity_type = ActivityType::ControlWork;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_description_fails() {
        let mut req = base_request(ActivityType::HomeworkTest);
        req.description = "   ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn week_start_must_be_monday() {
        let tuesday = WeeklyActivityAssignRequest {
            week_start: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        };
        assert!(tuesday.validate().is_err());

        let monday = WeeklyActivityAssignRequest {
            week_start: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
        };
        assert!(monday.validate().is_ok());
    }

    #[test]
    fn malformed_single_choice_rejected() {
        let req = UpsertQuestionRequest {
            order_index: 1,
            prompt: "2 + 2 = ?".into(),
            points: 1,
            details: QuestionDetails::SingleChoice {
                options: vec!["3".into(), "4".into()],
                correct_option: 1,
            },
        };
        assert!(req.validate().is_err());

        let req = UpsertQuestionRequest {
            details: QuestionDetails::SingleChoice {
                options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                correct_option: 5,
            },
            ..req
        };
        assert!(req.validate().is_err());
    }
}
