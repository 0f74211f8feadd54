use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::attempt_dto::AnswerItem;
use crate::error::{Error, Result};
use crate::models::question::{ActivityQuestion, QuestionDetails};

pub struct GradingService;

#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub selected_option: Option<i16>,
    pub text_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub points_awarded: Option<i32>,
    pub max_points: i32,
}

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub answers: Vec<GradedAnswer>,
    pub auto_score: i64,
    pub auto_max: i64,
    pub total_max: i64,
    pub needs_review: bool,
}

impl GradingService {
    /// Validates the answer sheet against the activity's questions and scores
    /// every auto-gradable answer. Open answers stay ungraded until manual
    /// review. Fails without any side effects on malformed input.
    pub fn grade(questions: &[ActivityQuestion], answers: &[AnswerItem]) -> Result<GradeOutcome> {
        let by_id: HashMap<Uuid, &ActivityQuestion> =
            questions.iter().map(|q| (q.id, q)).collect();

        let mut seen: HashSet<Uuid> = HashSet::new();
        for answer in answers {
            if !by_id.contains_key(&answer.question_id) {
                return Err(Error::BadRequest(format!(
                    "Answer references unknown question {}",
                    answer.question_id
                )));
            }
            if !seen.insert(answer.question_id) {
                return Err(Error::BadRequest(format!(
                    "Duplicate answer for question {}",
                    answer.question_id
                )));
            }
        }
        if seen.len() != questions.len() {
            return Err(Error::BadRequest(
                "Every question must be answered before submission".to_string(),
            ));
        }

        let mut graded = Vec::with_capacity(answers.len());
        let mut auto_score: i64 = 0;
        let mut auto_max: i64 = 0;
        let mut total_max: i64 = 0;
        let mut needs_review = false;

        for question in questions {
            let answer = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .expect("coverage checked above");
            total_max += question.points as i64;

            match &question.details.0 {
                QuestionDetails::SingleChoice { correct_option, .. } => {
                    let Some(selected) = answer.selected_option else {
                        return Err(Error::BadRequest(format!(
                            "Question {} requires a selected option",
                            question.order_index
                        )));
                    };
                    if !(1..=4).contains(&selected) {
                        return Err(Error::BadRequest(format!(
                            "Selected option for question {} must be between 1 and 4",
                            question.order_index
                        )));
                    }
                    let correct = selected == *correct_option;
                    let awarded = if correct { question.points } else { 0 };
                    auto_score += awarded as i64;
                    auto_max += question.points as i64;
                    graded.push(GradedAnswer {
                        question_id: question.id,
                        selected_option: Some(selected),
                        text_answer: None,
                        is_correct: Some(correct),
                        points_awarded: Some(awarded),
                        max_points: question.points,
                    });
                }
                QuestionDetails::Text { correct_answer } => {
                    let Some(text) = answer.text_answer.as_deref() else {
                        return Err(Error::BadRequest(format!(
                            "Question {} requires a text answer",
                            question.order_index
                        )));
                    };
                    let correct = normalize_text(text) == normalize_text(correct_answer);
                    let awarded = if correct { question.points } else { 0 };
                    auto_score += awarded as i64;
                    auto_max += question.points as i64;
                    graded.push(GradedAnswer {
                        question_id: question.id,
                        selected_option: None,
                        text_answer: Some(text.to_string()),
                        is_correct: Some(correct),
                        points_awarded: Some(awarded),
                        max_points: question.points,
                    });
                }
                QuestionDetails::Open => {
                    let Some(text) = answer.text_answer.as_deref() else {
                        return Err(Error::BadRequest(format!(
                            "Question {} requires a text answer",
                            question.order_index
                        )));
                    };
                    needs_review = true;
                    graded.push(GradedAnswer {
                        question_id: question.id,
                        selected_option: None,
                        text_answer: Some(text.to_string()),
                        is_correct: None,
                        points_awarded: None,
                        max_points: question.points,
                    });
                }
            }
        }

        Ok(GradeOutcome {
            answers: graded,
            auto_score,
            auto_max,
            total_max,
            needs_review,
        })
    }

    pub fn percent(score: Decimal, max: Decimal) -> Decimal {
        if max > Decimal::ZERO {
            (score / max * Decimal::from(100)).round_dp(2)
        } else {
            Decimal::ZERO
        }
    }
}

/// Case- and whitespace-insensitive comparison form for text answers.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
