//! Runtime configuration from the environment.
//!
//! Recognized variables:
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `DATABASE_URL` | (required) | PostgreSQL connection string |
//! | `JOBLY_POOL_MAX_SIZE` | `16` | maximum pooled connections |
//! | `JOBLY_SQL_LOG_MAX_LEN` | `200` | SQL truncation for [`crate::TracingClient`]; `0` disables truncation |
//!
//! A `.env` file in the working directory is loaded first if present.

use crate::error::{JoblyError, JoblyResult};

/// Connection and logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoblyConfig {
    pub database_url: String,
    pub pool_max_size: usize,
    /// `None` logs full SQL text.
    pub sql_log_max_len: Option<usize>,
}

impl JoblyConfig {
    pub const DEFAULT_POOL_MAX_SIZE: usize = 16;
    pub const DEFAULT_SQL_LOG_MAX_LEN: usize = 200;

    /// Defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: Self::DEFAULT_POOL_MAX_SIZE,
            sql_log_max_len: Some(Self::DEFAULT_SQL_LOG_MAX_LEN),
        }
    }

    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(database_url);
        if let Some(raw) = lookup("JOBLY_POOL_MAX_SIZE") {
            config.pool_max_size = parse_usize("JOBLY_POOL_MAX_SIZE", &raw)?;
            if config.pool_max_size == 0 {
                return Err(JoblyError::Config(
                    "JOBLY_POOL_MAX_SIZE must be at least 1".to_string(),
                ));
            }
        }
        if let Some(raw) = lookup("JOBLY_SQL_LOG_MAX_LEN") {
            config.sql_log_max_len = match parse_usize("JOBLY_SQL_LOG_MAX_LEN", &raw)? {
                0 => None,
                n => Some(n),
            };
        }
        Ok(config)
    }
}

fn parse_usize(key: &str, raw: &str) -> JoblyResult<usize> {
    raw.trim()
        .parse()
        .map_err(|e| JoblyError::Config(format!("{key}={raw:?} is not a valid number: {e}")))
}
