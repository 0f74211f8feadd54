use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use classroom_backend::dto::attempt_dto::AnswerItem;
use classroom_backend::models::question::{
    ActivityQuestion, QuestionDetails, QuestionType, QuestionView,
};
use classroom_backend::services::grading_service::{normalize_text, GradingService};

fn question(points: i32, order_index: i32, details: QuestionDetails) -> ActivityQuestion {
    let now = Utc::now();
    ActivityQuestion {
        id: Uuid::new_v4(),
        activity_id: Uuid::new_v4(),
        order_index,
        prompt: format!("Question {order_index}"),
        points,
        question_type: details.kind(),
        details: sqlx::types::Json(details),
        created_at: now,
        updated_at: now,
    }
}

fn single_choice(points: i32, order_index: i32, correct_option: i16) -> ActivityQuestion {
    question(
        points,
        order_index,
        QuestionDetails::SingleChoice {
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            correct_option,
        },
    )
}

fn choice(q: &ActivityQuestion, selected: i16) -> AnswerItem {
    AnswerItem {
        question_id: q.id,
        selected_option: Some(selected),
        text_answer: None,
    }
}

fn text(q: &ActivityQuestion, answer: &str) -> AnswerItem {
    AnswerItem {
        question_id: q.id,
        selected_option: None,
        text_answer: Some(answer.to_string()),
    }
}

#[test]
fn single_choice_scores_only_the_correct_option() {
    let q1 = single_choice(3, 1, 2);
    let q2 = single_choice(5, 2, 4);

    let outcome =
        GradingService::grade(&[q1.clone(), q2.clone()], &[choice(&q1, 2), choice(&q2, 1)])
            .expect("grading should succeed");

    assert_eq!(outcome.auto_score, 3);
    assert_eq!(outcome.auto_max, 8);
    assert_eq!(outcome.total_max, 8);
    assert!(!outcome.needs_review);

    let first = &outcome.answers[0];
    assert_eq!(first.is_correct, Some(true));
    assert_eq!(first.points_awarded, Some(3));
    let second = &outcome.answers[1];
    assert_eq!(second.is_correct, Some(false));
    assert_eq!(second.points_awarded, Some(0));
}

#[test]
fn text_answers_ignore_case_and_extra_whitespace() {
    let q = question(
        4,
        1,
        QuestionDetails::Text {
            correct_answer: "Rust Programming".to_string(),
        },
    );

    let outcome = GradingService::grade(&[q.clone()], &[text(&q, "  rust   PROGRAMMING ")])
        .expect("grading should succeed");

    assert_eq!(outcome.auto_score, 4);
    assert_eq!(outcome.answers[0].is_correct, Some(true));
}

#[test]
fn open_questions_wait_for_manual_review() {
    let q1 = single_choice(2, 1, 1);
    let q2 = question(10, 2, QuestionDetails::Open);

    let outcome = GradingService::grade(
        &[q1.clone(), q2.clone()],
        &[choice(&q1, 1), text(&q2, "An essay about ownership")],
    )
    .expect("grading should succeed");

    assert!(outcome.needs_review);
    assert_eq!(outcome.auto_score, 2);
    assert_eq!(outcome.auto_max, 2);
    assert_eq!(outcome.total_max, 12);

    let open = &outcome.answers[1];
    assert_eq!(open.is_correct, None);
    assert_eq!(open.points_awarded, None);
    assert_eq!(open.max_points, 10);
}

#[test]
fn unknown_question_reference_is_rejected() {
    let q = single_choice(1, 1, 1);
    let stray = AnswerItem {
        question_id: Uuid::new_v4(),
        selected_option: Some(1),
        text_answer: None,
    };
    let result = GradingService::grade(&[q.clone()], &[choice(&q, 1), stray]);
    assert!(result.is_err());
}

#[test]
fn duplicate_answers_are_rejected() {
    let q = single_choice(1, 1, 1);
    let result = GradingService::grade(&[q.clone()], &[choice(&q, 1), choice(&q, 2)]);
    assert!(result.is_err());
}

#[test]
fn incomplete_answer_sheet_is_rejected() {
    let q1 = single_choice(1, 1, 1);
    let q2 = single_choice(1, 2, 2);
    let result = GradingService::grade(&[q1.clone(), q2], &[choice(&q1, 1)]);
    assert!(result.is_err());
}

#[test]
fn selected_option_out_of_range_is_rejected() {
    let q = single_choice(1, 1, 1);
    let result = GradingService::grade(&[q.clone()], &[choice(&q, 5)]);
    assert!(result.is_err());
}

#[test]
fn percent_rounds_to_two_decimals() {
    let percent = GradingService::percent(Decimal::from(1), Decimal::from(3));
    assert_eq!(percent, Decimal::new(3333, 2));

    assert_eq!(
        GradingService::percent(Decimal::from(5), Decimal::ZERO),
        Decimal::ZERO
    );
}

#[test]
fn normalize_text_collapses_whitespace_and_case() {
    assert_eq!(normalize_text("  Foo\t BAR  baz "), "foo bar baz");
    assert_eq!(normalize_text(""), "");
}

#[test]
fn student_question_view_hides_the_answer_key() {
    let q = single_choice(2, 1, 3);
    let view = QuestionView::from(&q);
    assert_eq!(view.question_type, QuestionType::SingleChoice);
    assert_eq!(
        view.options.as_deref(),
        Some(
            &[
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ][..]
        )
    );

    let serialized = serde_json::to_value(&view).expect("serialize view");
    assert!(serialized.get("details").is_none());
    assert!(serialized.get("correct_option").is_none());
}
