//! Error types for the data layer.
//!
//! Backend failures surface as [`DbError`] inside this crate and are folded
//! into the engine's [`StoreError`] and [`SinkError`] at the trait boundary.

use sovereign_core::{SinkError, StoreError};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// `PostgreSQL` error codes that mean "lost a race", not "broken".
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

impl DbError {
    /// Whether the database aborted the transaction because of contention.
    pub fn is_contention(&self) -> bool {
        match self {
            Self::Postgres(sqlx::Error::Database(db)) => db
                .code()
                .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref())),
            _ => false,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }
}

impl From<DbError> for SinkError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Serialization(source) => Self::Encoding { source },
            other => Self::Unavailable {
                message: other.to_string(),
            },
        }
    }
}
