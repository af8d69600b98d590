//! The engine: one store, one random source, one history sink.
//!
//! Operations live in sibling modules as `impl` blocks on [`Engine`]:
//! [`crate::conquest`] (claim, attack), [`crate::founding`] (found nation,
//! change policy), [`crate::tick`] (yield tick) and [`crate::admin`]
//! (world seeding).

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use sovereign_types::{
    Cell, CellCoord, CommandKind, LogEntry, LogEntryId, Nation, NationDelta, NationId,
    NewsCategory, NewsEvent, NewsEventId,
};

use crate::atomic::decode;
use crate::config::{RulesConfig, SovereignConfig, WorldConfig};
use crate::error::ConquestError;
use crate::history::HistorySink;
use crate::random::RandomSource;
use crate::store::{DocumentStore, cell_key, nation_key};

/// The authoritative state engine.
///
/// Holds no game state itself. Every decision re-reads the store inside an
/// atomic transaction.
#[derive(Debug)]
pub struct Engine<S, R, H> {
    pub(crate) store: S,
    rng: Mutex<R>,
    pub(crate) history: H,
    pub(crate) rules: RulesConfig,
    pub(crate) world: WorldConfig,
}

impl<S, R, H> Engine<S, R, H>
where
    S: DocumentStore,
    R: RandomSource,
    H: HistorySink,
{
    /// Assemble an engine from its collaborators.
    pub fn new(store: S, rng: R, history: H, config: &SovereignConfig) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            history,
            rules: config.rules.clone(),
            world: config.world.clone(),
        }
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The history sink.
    pub const fn history(&self) -> &H {
        &self.history
    }

    /// Active rule constants.
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Active world settings.
    pub const fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// Draw from the random source. The lock is never held across an await.
    pub(crate) fn with_rng<T>(&self, draw: impl FnOnce(&mut R) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut rng)
    }

    // -----------------------------------------------------------------------
    // Display reads
    // -----------------------------------------------------------------------

    /// Current nation document, for display only.
    ///
    /// Never feed the result back into a mutation; operations re-read inside
    /// their own transaction.
    pub async fn nation(&self, id: NationId) -> Result<Option<Nation>, ConquestError> {
        let key = nation_key(id);
        let doc = self.store.get(&key).await?;
        decode(&key, doc.body)
    }

    /// Current cell document, for display only.
    pub async fn cell(&self, coord: CellCoord) -> Result<Option<Cell>, ConquestError> {
        let key = cell_key(coord);
        let doc = self.store.get(&key).await?;
        decode(&key, doc.body)
    }

    // -----------------------------------------------------------------------
    // History emission
    // -----------------------------------------------------------------------

    /// Append a log entry after commit. Failures are logged and swallowed.
    pub(crate) async fn record_log(
        &self,
        actor: NationId,
        command: CommandKind,
        narrative: String,
        deltas: NationDelta,
        at: DateTime<Utc>,
    ) {
        let entry = LogEntry {
            id: LogEntryId::new(),
            actor,
            command,
            narrative,
            deltas,
            created_at: at,
        };
        if let Err(err) = self.history.append_log(&entry).await {
            tracing::warn!(%actor, ?command, error = %err, "failed to append log entry");
        }
    }

    /// Publish war news after commit. Failures are logged and swallowed.
    pub(crate) async fn record_news(&self, message: String, at: DateTime<Utc>) {
        let event = NewsEvent {
            id: NewsEventId::new(),
            category: NewsCategory::War,
            message,
            created_at: at,
        };
        if let Err(err) = self.history.publish_news(&event).await {
            tracing::warn!(error = %err, "failed to publish news");
        }
    }
}

/// Log a failed operation at a level matching its class.
///
/// Rejections are routine player feedback; only store failures are errors.
pub(crate) fn trace_failure(operation: &'static str, actor: NationId, err: &ConquestError) {
    match err {
        ConquestError::Rejected(rejection) => {
            tracing::debug!(operation, %actor, code = rejection.code(), "action rejected");
        }
        ConquestError::Validation { message } => {
            tracing::debug!(operation, %actor, %message, "invalid request");
        }
        ConquestError::Conflict { .. } | ConquestError::ConflictRetry { .. } => {
            tracing::warn!(operation, %actor, error = %err, "gave up after conflicts");
        }
        ConquestError::StoreUnavailable { message } => {
            tracing::error!(operation, %actor, %message, "store unavailable");
        }
    }
}
