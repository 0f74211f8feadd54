pub mod achievement;
pub mod activity;
pub mod attempt;
pub mod course;
pub mod lesson;
pub mod notification;
pub mod question;
pub mod study_class;
pub mod user;
