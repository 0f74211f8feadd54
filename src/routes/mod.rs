pub mod achievements;
pub mod activities;
pub mod attempts;
pub mod auth;
pub mod classes;
pub mod courses;
pub mod health;
pub mod lessons;
pub mod notifications;
pub mod stats;
pub mod users;
