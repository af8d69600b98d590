//! Territory store, atomic transactions, and the conquest protocol for the
//! Sovereign engine.
//!
//! [`Engine`] is generic over three seams: the [`DocumentStore`] holding
//! cells and nations, the [`RandomSource`] feeding combat and placement, and
//! the [`HistorySink`] receiving log entries and news. Every mutating
//! operation runs inside [`run_atomic`], so decisions are only ever made on
//! reads that are still current at commit time.
//!
//! # Modules
//!
//! - [`store`] -- Versioned document store interface and storage keys.
//! - [`memory`] -- In-process [`DocumentStore`].
//! - [`atomic`] -- Optimistic transactions and the bounded retry runner.
//! - [`engine`] -- The [`Engine`] and its display reads.
//! - [`conquest`] -- Claim and attack.
//! - [`founding`] -- Founding nations and changing policies.
//! - [`tick`] -- The per-nation yield tick.
//! - [`admin`] -- World seeding.
//! - [`random`] -- Injectable randomness.
//! - [`history`] -- Log and news sinks.
//! - [`config`] -- `sovereign-config.yaml` loading.
//! - [`error`] -- Rejections and operation errors.

pub mod admin;
pub mod atomic;
pub mod config;
pub mod conquest;
pub mod engine;
pub mod error;
pub mod founding;
pub mod history;
pub mod memory;
pub mod random;
pub mod store;
pub mod tick;

pub use admin::SeedSummary;
pub use atomic::{ReadBatch, Staged, Transaction, run_atomic};
pub use config::{
    ConfigError, InfrastructureConfig, LoggingConfig, RulesConfig, SovereignConfig, StoreBackend,
    WorldConfig,
};
pub use conquest::{attacker_prevails, loot_for};
pub use engine::Engine;
pub use error::{ConquestError, Rejection};
pub use founding::{FoundingRequest, ideology_bonus, new_nation};
pub use history::{HistorySink, MemoryHistory, SinkError};
pub use memory::MemoryStore;
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use store::{CommitBatch, DocumentStore, StoreError, Versioned, cell_key, nation_key};
