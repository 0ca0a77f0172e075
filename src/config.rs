use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// No database means an in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_api_per_min: u32,
    pub rate_actions_per_min: u32,

    /// Yearly paid-leave allowance, in days.
    pub annual_leave_days: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
    pub run_migrations: bool,
}

/// Upper bound for `ANNUAL_LEAVE_DAYS`.
pub const MAX_ANNUAL_LEAVE_DAYS: u32 = 366;

fn annual_leave_days(days: u32) -> Result<u32> {
    anyhow::ensure!(
        days <= MAX_ANNUAL_LEAVE_DAYS,
        "ANNUAL_LEAVE_DAYS must be at most {MAX_ANNUAL_LEAVE_DAYS}, got {days}"
    );
    Ok(days)
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{key} has an invalid value `{raw}`")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_api_per_min: var_or("RATE_API_PER_MIN", 1000)?,
            rate_actions_per_min: var_or("RATE_ACTIONS_PER_MIN", 120)?,

            annual_leave_days: annual_leave_days(var_or("ANNUAL_LEAVE_DAYS", 25)?)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: var_or("LOG_LEVEL", tracing::Level::DEBUG)?,
            run_migrations: var_or("RUN_MIGRATIONS", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_leave_allowance_is_bounded() {
        assert_eq!(annual_leave_days(25).unwrap(), 25);
        assert_eq!(annual_leave_days(MAX_ANNUAL_LEAVE_DAYS).unwrap(), MAX_ANNUAL_LEAVE_DAYS);
        let err = annual_leave_days(u32::MAX).unwrap_err();
        assert!(err.to_string().contains("ANNUAL_LEAVE_DAYS"));
    }
}
