//! Error types for the server binary.
//!
//! [`StartupError`] wraps every failure between reading the config file
//! and the HTTP server returning, so `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: sovereign_core::ConfigError,
    },

    /// A backing service could not be reached or migrated.
    #[error("database error: {source}")]
    Database {
        /// The underlying data layer error.
        #[from]
        source: sovereign_db::DbError,
    },

    /// Filling in the map at startup failed.
    #[error("world seeding failed: {source}")]
    Seed {
        /// The underlying engine error.
        #[from]
        source: sovereign_core::ConquestError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: sovereign_api::ServerError,
    },
}
