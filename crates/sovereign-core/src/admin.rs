//! Operator actions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use sovereign_world::generate_world;
use tracing::info;

use crate::engine::Engine;
use crate::error::ConquestError;
use crate::history::HistorySink;
use crate::random::RandomSource;
use crate::store::{CommitBatch, DocumentStore, StoreError, cell_key};

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Edge length of the generated map.
    pub size: u32,
    /// Cells written.
    pub created: usize,
    /// Cells left alone because they already existed.
    pub skipped: usize,
    /// Land cells among those written.
    pub land: usize,
}

impl<S, R, H> Engine<S, R, H>
where
    S: DocumentStore,
    R: RandomSource,
    H: HistorySink,
{
    /// Generate a `size x size` world and store every cell that does not
    /// exist yet.
    ///
    /// Existing cells, owned or not, are never overwritten, so reseeding a
    /// live world only fills gaps. Uses the configured world size when
    /// `size` is `None`.
    pub async fn seed_world(&self, size: Option<u32>) -> Result<SeedSummary, ConquestError> {
        let size = size.unwrap_or(self.world.size);
        let seed = self
            .world
            .seed
            .unwrap_or_else(|| self.with_rng(|r| r.next_seed()));
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = generate_world(size, &mut rng)?;

        let keys: Vec<String> = cells.iter().map(|c| cell_key(c.coord)).collect();
        let existing = self.store.get_many(&keys).await?;

        let mut summary = SeedSummary {
            size,
            ..SeedSummary::default()
        };
        let mut batch = CommitBatch::default();
        for (cell, doc) in cells.iter().zip(existing) {
            if doc.version != 0 {
                summary.skipped = summary.skipped.saturating_add(1);
                continue;
            }
            let body = serde_json::to_value(cell).map_err(|source| StoreError::Corrupt {
                key: doc.key.clone(),
                source,
            })?;
            batch.expected.insert(doc.key.clone(), 0);
            batch.writes.insert(doc.key, body);
            summary.created = summary.created.saturating_add(1);
            if !cell.is_ocean() {
                summary.land = summary.land.saturating_add(1);
            }
        }

        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        info!(
            size,
            seed,
            created = summary.created,
            skipped = summary.skipped,
            land = summary.land,
            "world seeded"
        );
        Ok(summary)
    }
}
