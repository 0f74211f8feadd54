use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub uploads_dir: String,
    pub avatar_max_bytes: usize,
    pub presentation_max_bytes: usize,
    pub default_admin_username: String,
    pub default_admin_email: String,
    pub default_admin_password: String,
    pub smtp: Option<SmtpConfig>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        // SMTP is optional; when any part is missing the mail service stays
        // unconfigured and sending fails with Error::Unconfigured.
        let smtp = match (
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_USERNAME").ok(),
            env::var("SMTP_PASSWORD").ok(),
            env::var("SMTP_FROM").ok(),
        ) {
            (Some(host), Some(username), Some(password), Some(from_address)) => Some(SmtpConfig {
                host,
                username,
                password,
                from_address,
            }),
            _ => None,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_or_parse("DB_MAX_CONNECTIONS", 50)?,
            db_acquire_timeout_secs: get_env_or_parse("DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_or_parse("JWT_TTL_HOURS", 24)?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            avatar_max_bytes: get_env_or_parse("AVATAR_MAX_BYTES", 2 * 1024 * 1024)?,
            presentation_max_bytes: get_env_or_parse("PRESENTATION_MAX_BYTES", 20 * 1024 * 1024)?,
            default_admin_username: env::var("DEFAULT_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            default_admin_email: env::var("DEFAULT_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@classroom.local".to_string()),
            default_admin_password: get_env("DEFAULT_ADMIN_PASSWORD")?,
            smtp,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
