use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    Text,
    Open,
}

/// Per-type question payload. One variant per question type, each carrying only
/// its legal fields, so inconsistent combinations cannot be constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum QuestionDetails {
    SingleChoice {
        options: Vec<String>,
        correct_option: i16,
    },
    Text {
        correct_answer: String,
    },
    Open,
}

impl QuestionDetails {
    pub fn kind(&self) -> QuestionType {
        match self {
            QuestionDetails::SingleChoice { .. } => QuestionType::SingleChoice,
            QuestionDetails::Text { .. } => QuestionType::Text,
            QuestionDetails::Open => QuestionType::Open,
        }
    }

    /// Invariants serde cannot express: exactly four non-blank options and a
    /// correct_option within [1, 4]; a non-blank reference answer for text.
    pub fn check(&self) -> Result<(), String> {
        match self {
            QuestionDetails::SingleChoice {
                options,
                correct_option,
            } => {
                if options.len() != 4 {
                    return Err("single_choice requires exactly 4 options".to_string());
                }
                if options.iter().any(|o| o.trim().is_empty()) {
                    return Err("single_choice options must be non-blank".to_string());
                }
                if !(1..=4).contains(correct_option) {
                    return Err("correct_option must be between 1 and 4".to_string());
                }
                Ok(())
            }
            QuestionDetails::Text { correct_answer } => {
                if correct_answer.trim().is_empty() {
                    return Err("text questions require a non-blank correct_answer".to_string());
                }
                Ok(())
            }
            QuestionDetails::Open => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityQuestion {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub question_type: QuestionType,
    pub details: sqlx::types::Json<QuestionDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student-facing projection of a question: keeps the answer key out of
/// responses while still exposing the options to pick from.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
}

impl From<&ActivityQuestion> for QuestionView {
    fn from(q: &ActivityQuestion) -> Self {
        let options = match &q.details.0 {
            QuestionDetails::SingleChoice { options, .. } => Some(options.clone()),
            _ => None,
        };
        QuestionView {
            id: q.id,
            activity_id: q.activity_id,
            order_index: q.order_index,
            prompt: q.prompt.clone(),
            points: q.points,
            question_type: q.question_type,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_serialize_with_a_type_tag() {
        let details = QuestionDetails::Text {
            correct_answer: "42".to_string(),
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["question_type"], "text");
        assert_eq!(value["correct_answer"], "42");

        let parsed: QuestionDetails =
            serde_json::from_value(serde_json::json!({ "question_type": "open" })).unwrap();
        assert!(matches!(parsed, QuestionDetails::Open));
    }

    #[test]
    fn mismatched_fields_fail_to_deserialize() {
        let raw = serde_json::json!({
            "question_type": "text",
            "options": ["a", "b", "c", "d"],
            "correct_option": 1
        });
        assert!(serde_json::from_value::<QuestionDetails>(raw).is_err());
    }
}
