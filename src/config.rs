//! Environment-driven configuration

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Days after delivery during which a return may be requested.
    pub return_window_days: i64,
    pub admin_api_key: String,
    pub nats_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            port: env_parse("PORT", 8084),
            return_window_days: env_parse("RETURN_WINDOW_DAYS", 7),
            admin_api_key: std::env::var("ADMIN_API_KEY").unwrap_or_else(|_| "dev-admin-key".into()),
            nats_url: std::env::var("NATS_URL").ok(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
