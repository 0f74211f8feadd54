pub mod achievement_service;
pub mod activity_service;
pub mod attempt_service;
pub mod auth_service;
pub mod class_service;
pub mod course_service;
pub mod grading_service;
pub mod lesson_service;
pub mod mail_service;
pub mod notification_service;
pub mod question_service;
pub mod stats_service;
pub mod storage_service;
pub mod user_service;
