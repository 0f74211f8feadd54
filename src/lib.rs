pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    achievement_service::AchievementService, activity_service::ActivityService,
    attempt_service::AttemptService, auth_service::AuthService, class_service::ClassService,
    course_service::CourseService, lesson_service::LessonService, mail_service::MailService,
    notification_service::NotificationService, question_service::QuestionService,
    stats_service::StatsService, storage_service::StorageService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub class_service: ClassService,
    pub lesson_service: LessonService,
    pub activity_service: ActivityService,
    pub question_service: QuestionService,
    pub attempt_service: AttemptService,
    pub achievement_service: AchievementService,
    pub notification_service: NotificationService,
    pub mail_service: MailService,
    pub storage_service: StorageService,
    pub stats_service: StatsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        Self {
            auth_service: AuthService::new(pool.clone()),
            user_service: UserService::new(pool.clone()),
            course_service: CourseService::new(pool.clone()),
            class_service: ClassService::new(pool.clone()),
            lesson_service: LessonService::new(pool.clone()),
            activity_service: ActivityService::new(pool.clone()),
            question_service: QuestionService::new(pool.clone()),
            attempt_service: AttemptService::new(pool.clone()),
            achievement_service: AchievementService::new(pool.clone()),
            notification_service: NotificationService::new(pool.clone()),
            mail_service: MailService::new(config.smtp.clone()),
            storage_service: StorageService::new(config.uploads_dir.clone()),
            stats_service: StatsService::new(pool.clone()),
            pool,
        }
    }
}
