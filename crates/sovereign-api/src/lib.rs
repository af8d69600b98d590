//! HTTP API for the Sovereign engine.
//!
//! An Axum router over a shared [`Engine`](sovereign_core::Engine). Commands
//! (claim, attack, found, change policy, yield tick, seed) are thin
//! wrappers around engine operations; reads are display-only snapshots of
//! cells, nations, logs, news and the policy catalog.
//!
//! Errors render as `{"error", "code", "status"}` JSON, see [`ApiError`].
//! That includes malformed request bodies, see [`ApiJson`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use extract::ApiJson;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind_listener, start_server};
pub use state::AppState;
