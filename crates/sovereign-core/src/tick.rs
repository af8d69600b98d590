//! Per-nation yield tick.

use sovereign_economy::calculate_yields;
use sovereign_types::{NationId, YieldResult};
use tracing::info;

use crate::atomic::{Transaction, run_atomic};
use crate::engine::{Engine, trace_failure};
use crate::error::{ConquestError, Rejection};
use crate::history::HistorySink;
use crate::random::RandomSource;
use crate::store::DocumentStore;

impl<S, R, H> Engine<S, R, H>
where
    S: DocumentStore,
    R: RandomSource,
    H: HistorySink,
{
    /// Run one tick of production and consumption for a nation.
    ///
    /// Deltas are applied atomically. Stockpiles never go below zero. A
    /// fallen nation is refused and left untouched.
    pub async fn run_yield_tick(&self, nation_id: NationId) -> Result<YieldResult, ConquestError> {
        let store = &self.store;
        let result = run_atomic(store, self.rules.max_conflict_retries, || async move {
            let mut txn = Transaction::begin(store);
            let mut nation = txn
                .read_nation(nation_id)
                .await?
                .ok_or(Rejection::NationNotFound)?;
            if !nation.is_alive() {
                return Err(Rejection::NationFallen.into());
            }

            let result = calculate_yields(&nation);
            for (&kind, &delta) in &result.resource_deltas {
                nation.adjust_resource(kind, delta);
            }
            txn.write_nation(&nation)?;
            Ok(txn.finish(result))
        })
        .await
        .inspect_err(|err| trace_failure("yield_tick", nation_id, err))?;

        info!(nation = %nation_id, deltas = ?result.resource_deltas, "yield tick applied");
        Ok(result)
    }
}
