//! Durable backends for the Sovereign engine (`PostgreSQL` + `Dragonfly`).
//!
//! `PostgreSQL` holds the authoritative cell and nation documents behind the
//! engine's [`DocumentStore`](sovereign_core::DocumentStore) trait.
//! `Dragonfly` holds the append-only history lists behind
//! [`HistorySink`](sovereign_core::HistorySink).
//!
//! # Modules
//!
//! - [`postgres`] -- Versioned document table with optimistic commits
//! - [`dragonfly`] -- Per-nation log lists and the war news list
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod postgres;

pub use dragonfly::{DragonflyHistory, NEWS_KEY, log_key};
pub use error::DbError;
pub use postgres::{PgDocumentStore, PostgresConfig};
