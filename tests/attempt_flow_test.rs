use std::env;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use classroom_backend::dto::activity_dto::{CreateActivityRequest, UpsertQuestionRequest};
use classroom_backend::dto::attempt_dto::{AnswerItem, SubmitAttemptRequest};
use classroom_backend::dto::auth_dto::{LoginRequest, RegisterRequest};
use classroom_backend::error::Error;
use classroom_backend::models::activity::ActivityType;
use classroom_backend::models::question::QuestionDetails;
use classroom_backend::models::user::Role;
use classroom_backend::policy::Principal;
use classroom_backend::AppState;

const TEST_PASSWORD: &str = "Sup3r-secret!";

/// These tests need a live Postgres; without DATABASE_URL they are skipped.
async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL is not set, skipping database-backed test");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("DEFAULT_ADMIN_PASSWORD", "admin_password_123");
    let _ = classroom_backend::config::init_config();

    let pool = classroom_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

async fn seed_user(pool: &PgPool, role: Role) -> Principal {
    let marker = Uuid::new_v4().simple().to_string();
    let hash =
        classroom_backend::services::auth_service::hash_password(TEST_PASSWORD).expect("hash");
    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users (username, email, password_hash, full_name, role)
           VALUES ($1, $2, $3, $4, $5::user_role)
           RETURNING id"#,
    )
    .bind(format!("{}_{}", role.as_str(), marker))
    .bind(format!("{}_{}@example.com", role.as_str(), marker))
    .bind(hash)
    .bind("Seeded User")
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .expect("seed user");
    Principal { id, role }
}

async fn seed_course(pool: &PgPool, methodist_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"INSERT INTO courses (title, description, methodist_id)
           VALUES ('Mathematics', 'Grade 5 mathematics', $1)
           RETURNING id"#,
    )
    .bind(methodist_id)
    .fetch_one(pool)
    .await
    .expect("seed course")
}

/// Creates a published homework activity with one single-choice question and
/// returns (activity_id, question_id).
async fn seed_published_activity(
    state: &AppState,
    methodist: &Principal,
    course_id: Uuid,
) -> (Uuid, Uuid) {
    let activity = state
        .activity_service
        .create_activity(
            methodist,
            CreateActivityRequest {
                course_id,
                lesson_id: None,
                title: "Fractions homework".into(),
                description: "Solve all exercises".into(),
                topic: "Fractions".into(),
                activity_type: ActivityType::HomeworkTest,
                deadline: Utc::now() + Duration::days(7),
                time_limit_seconds: None,
                weight_multiplier: None,
            },
        )
        .await
        .expect("create activity");
    let question = state
        .question_service
        .upsert_question(
            methodist,
            activity.id,
            UpsertQuestionRequest {
                order_index: 1,
                prompt: "2 + 2 = ?".into(),
                points: 1,
                details: QuestionDetails::SingleChoice {
                    options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                    correct_option: 2,
                },
            },
        )
        .await
        .expect("upsert question");
    state
        .activity_service
        .publish_activity(methodist, activity.id)
        .await
        .expect("publish");
    (activity.id, question.id)
}

#[tokio::test]
async fn second_start_while_one_is_live_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let state = AppState::new(pool.clone());
    let methodist = seed_user(&pool, Role::Methodist).await;
    let student = seed_user(&pool, Role::Student).await;
    let course_id = seed_course(&pool, methodist.id).await;
    let (activity_id, _) = seed_published_activity(&state, &methodist, course_id).await;

    state
        .attempt_service
        .start_attempt(&student, activity_id)
        .await
        .expect("first start");
    let err = state
        .attempt_service
        .start_attempt(&student, activity_id)
        .await
        .expect_err("second start must fail");
    assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn resubmitting_a_submitted_attempt_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let state = AppState::new(pool.clone());
    let methodist = seed_user(&pool, Role::Methodist).await;
    let student = seed_user(&pool, Role::Student).await;
    let course_id = seed_course(&pool, methodist.id).await;
    let (activity_id, question_id) = seed_published_activity(&state, &methodist, course_id).await;

    let attempt = state
        .attempt_service
        .start_attempt(&student, activity_id)
        .await
        .expect("start");
    let answers = SubmitAttemptRequest {
        answers: vec![AnswerItem {
            question_id,
            selected_option: Some(2),
            text_answer: None,
        }],
    };
    state
        .attempt_service
        .submit_attempt(&student, attempt.id, answers.clone())
        .await
        .expect("first submit");
    let err = state
        .attempt_service
        .submit_attempt(&student, attempt.id, answers)
        .await
        .expect_err("second submit must fail");
    assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn awarding_the_same_achievement_twice_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let state = AppState::new(pool.clone());
    let methodist = seed_user(&pool, Role::Methodist).await;
    let student = seed_user(&pool, Role::Student).await;
    let course_id = seed_course(&pool, methodist.id).await;

    let achievement = state
        .achievement_service
        .create_achievement(
            &methodist,
            classroom_backend::dto::achievement_dto::CreateAchievementRequest {
                course_id,
                title: "Fraction wizard".into(),
                joke_description: None,
                description: "Solved every fraction exercise".into(),
            },
        )
        .await
        .expect("create achievement");

    state
        .achievement_service
        .award(&methodist, achievement.id, student.id)
        .await
        .expect("first award");
    let err = state
        .achievement_service
        .award(&methodist, achievement.id, student.id)
        .await
        .expect_err("second award must fail");
    assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn login_matches_email_before_username() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let state = AppState::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let shared = format!("shared_{}@example.com", marker);

    // User A owns the email; user B's username is that same string.
    let owner = state
        .auth_service
        .register(RegisterRequest {
            username: format!("owner_{}", marker),
            email: shared.clone(),
            password: TEST_PASSWORD.into(),
            full_name: "Email Owner".into(),
        })
        .await
        .expect("register owner");
    let hash =
        classroom_backend::services::auth_service::hash_password(TEST_PASSWORD).expect("hash");
    sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, full_name, role)
           VALUES ($1, $2, $3, 'Name Squatter', 'student')"#,
    )
    .bind(&shared)
    .bind(format!("squatter_{}@example.com", marker))
    .bind(hash)
    .execute(&pool)
    .await
    .expect("seed squatter");

    let response = state
        .auth_service
        .login(LoginRequest {
            login: shared,
            password: TEST_PASSWORD.into(),
        })
        .await
        .expect("login");
    assert_eq!(response.user.id, owner.id);
}
