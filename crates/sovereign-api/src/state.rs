//! Shared application state for the API server.
//!
//! [`AppState`] owns the [`Engine`]. Handlers hold no game state of their
//! own; every request goes through the engine, which re-reads the store.

use sovereign_core::Engine;

/// State shared by every handler behind an [`Arc`](std::sync::Arc).
#[derive(Debug)]
pub struct AppState<S, R, H> {
    /// The authoritative state engine.
    pub engine: Engine<S, R, H>,
}

impl<S, R, H> AppState<S, R, H> {
    /// Wrap an engine.
    pub const fn new(engine: Engine<S, R, H>) -> Self {
        Self { engine }
    }
}
