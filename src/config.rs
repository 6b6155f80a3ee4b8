use crate::constants::*;
use crate::error::ConfigError;
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let log_filter = lookup("EXPENSE_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        if data_path.trim().is_empty() {
            return Err(ConfigError::EmptyDataPath);
        }

        // Validate the filter up front so a typo fails at start-up
        if EnvFilter::try_new(&log_filter).is_err() {
            return Err(ConfigError::InvalidLogFilter(log_filter));
        }

        Ok(Config {
            data_path,
            log_filter,
        })
    }
}
