use thiserror::Error;

/// Failures surfaced by the expense and preference stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("expense {0} does not exist")]
    NotFound(i64),
    #[error("stored value for {key} is invalid: {value}")]
    InvalidValue { key: String, value: i64 },
    #[error("storage fault: {0}")]
    Storage(#[from] libsql::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    InvalidTime { hour: u8, minute: u8 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_PATH must not be empty")]
    EmptyDataPath,
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
}
