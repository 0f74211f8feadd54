use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// One answer per question; exactly one of the two payload fields is used
/// depending on the question type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerItem {
    pub question_id: Uuid,
    pub selected_option: Option<i16>,
    pub text_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1))]
    pub answers: Vec<AnswerItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAnswerAward {
    pub question_id: Uuid,
    pub points_awarded: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeAttemptRequest {
    #[serde(default)]
    #[validate(custom(function = "no_duplicate_awards"))]
    pub awards: Vec<OpenAnswerAward>,
}

fn no_duplicate_awards(awards: &[OpenAnswerAward]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for award in awards {
        if !seen.insert(award.question_id) {
            let mut err = ValidationError::new("awards");
            err.message = Some("each question may be awarded at most once".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AttemptResultResponse {
    pub attempt: crate::models::attempt::Attempt,
    pub answers: Vec<crate::models::attempt::AttemptAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_awards_for_one_question_fail_validation() {
        let question_id = Uuid::new_v4();
        let req = GradeAttemptRequest {
            awards: vec![
                OpenAnswerAward {
                    question_id,
                    points_awarded: 3,
                },
                OpenAnswerAward {
                    question_id,
                    points_awarded: 5,
                },
            ],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn distinct_awards_pass_validation() {
        let req = GradeAttemptRequest {
            awards: vec![
                OpenAnswerAward {
                    question_id: Uuid::new_v4(),
                    points_awarded: 3,
                },
                OpenAnswerAward {
                    question_id: Uuid::new_v4(),
                    points_awarded: 0,
                },
            ],
        };
        assert!(req.validate().is_ok());
    }
}
