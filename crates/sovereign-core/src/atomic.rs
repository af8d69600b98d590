//! Optimistic transactions over a [`DocumentStore`].
//!
//! A [`Transaction`] records the version of every document it reads and
//! buffers every write. Finishing it yields a [`Staged`] value whose commit
//! batch names those versions, so the store refuses the commit if anything
//! the decision depended on has moved since.
//!
//! [`run_atomic`] drives attempts: each attempt builds a fresh transaction,
//! reads, decides and stages writes. Conflicts (at read or commit time) start
//! a new attempt, up to a fixed bound. A rejected or failed attempt commits
//! nothing.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sovereign_types::{Cell, CellCoord, Nation, NationId};

use crate::error::ConquestError;
use crate::store::{CommitBatch, DocumentStore, StoreError, cell_key, nation_key};

/// The result of one attempt, ready to commit.
#[derive(Debug)]
pub struct Staged<T> {
    value: T,
    batch: CommitBatch,
}

/// Documents returned by [`Transaction::read_batch`].
#[derive(Debug, Default)]
pub struct ReadBatch {
    /// Requested cells, in request order.
    pub cells: Vec<Option<Cell>>,
    /// Requested nations, in request order.
    pub nations: Vec<Option<Nation>>,
}

/// Reads and buffered writes for one attempt.
#[derive(Debug)]
pub struct Transaction<'s, S> {
    store: &'s S,
    reads: BTreeMap<String, u64>,
    writes: BTreeMap<String, Value>,
}

impl<'s, S: DocumentStore> Transaction<'s, S> {
    /// Start an empty transaction against `store`.
    pub fn begin(store: &'s S) -> Self {
        Self {
            store,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Read raw documents in one batch and record their versions.
    ///
    /// A document read twice at different versions is a conflict.
    async fn read_bodies(&mut self, keys: &[String]) -> Result<Vec<Option<Value>>, ConquestError> {
        let docs = self.store.get_many(keys).await?;
        let mut bodies = Vec::with_capacity(docs.len());
        for doc in docs {
            match self.reads.get(&doc.key) {
                Some(&seen) if seen != doc.version => {
                    return Err(ConquestError::Conflict { key: doc.key });
                }
                Some(_) => {}
                None => {
                    self.reads.insert(doc.key.clone(), doc.version);
                }
            }
            bodies.push(doc.body);
        }
        Ok(bodies)
    }

    /// Read cells and nations together in one round trip.
    ///
    /// Results come back in request order within each kind.
    pub async fn read_batch(
        &mut self,
        cells: &[CellCoord],
        nations: &[NationId],
    ) -> Result<ReadBatch, ConquestError> {
        let cell_keys = cells.iter().map(|c| cell_key(*c));
        let nation_keys = nations.iter().map(|id| nation_key(*id));
        let keys: Vec<String> = cell_keys.chain(nation_keys).collect();

        let bodies = self.read_bodies(&keys).await?;
        let mut batch = ReadBatch {
            cells: Vec::with_capacity(cells.len()),
            nations: Vec::with_capacity(nations.len()),
        };
        for (i, (key, body)) in keys.iter().zip(bodies).enumerate() {
            if i < cells.len() {
                batch.cells.push(decode(key, body)?);
            } else {
                batch.nations.push(decode(key, body)?);
            }
        }
        Ok(batch)
    }

    /// Read several cells in one batch. Missing cells are `None`.
    pub async fn read_cells(
        &mut self,
        coords: &[CellCoord],
    ) -> Result<Vec<Option<Cell>>, ConquestError> {
        Ok(self.read_batch(coords, &[]).await?.cells)
    }

    /// Read a nation and a cell in one batch.
    pub async fn read_nation_and_cell(
        &mut self,
        id: NationId,
        coord: CellCoord,
    ) -> Result<(Option<Nation>, Option<Cell>), ConquestError> {
        let batch = self.read_batch(&[coord], &[id]).await?;
        Ok((
            batch.nations.into_iter().next().flatten(),
            batch.cells.into_iter().next().flatten(),
        ))
    }

    /// Read one nation.
    pub async fn read_nation(&mut self, id: NationId) -> Result<Option<Nation>, ConquestError> {
        let batch = self.read_batch(&[], &[id]).await?;
        Ok(batch.nations.into_iter().next().flatten())
    }

    /// Buffer a cell write.
    pub fn write_cell(&mut self, cell: &Cell) -> Result<(), ConquestError> {
        self.write(cell_key(cell.coord), cell)
    }

    /// Buffer a nation write.
    pub fn write_nation(&mut self, nation: &Nation) -> Result<(), ConquestError> {
        self.write(nation_key(nation.id), nation)
    }

    fn write<T: Serialize>(&mut self, key: String, doc: &T) -> Result<(), ConquestError> {
        let body = serde_json::to_value(doc).map_err(|source| StoreError::Corrupt {
            key: key.clone(),
            source,
        })?;
        self.writes.insert(key, body);
        Ok(())
    }

    /// Close the attempt, pairing `value` with the staged writes.
    pub fn finish<T>(self, value: T) -> Staged<T> {
        Staged {
            value,
            batch: CommitBatch {
                expected: self.reads,
                writes: self.writes,
            },
        }
    }
}

/// Decode a stored body. A body that no longer matches the schema is corrupt.
pub(crate) fn decode<T: DeserializeOwned>(
    key: &str,
    body: Option<Value>,
) -> Result<Option<T>, ConquestError> {
    body.map(|b| {
        serde_json::from_value(b).map_err(|source| {
            ConquestError::from(StoreError::Corrupt {
                key: key.to_owned(),
                source,
            })
        })
    })
    .transpose()
}

/// Run `attempt` until its staged writes commit, a rule rejects it, or
/// `max_attempts` conflicts have occurred.
///
/// Each call of `attempt` must begin its own [`Transaction`]. Read-only
/// attempts (no writes) still succeed without touching the store.
pub async fn run_atomic<S, T, F, Fut>(
    store: &S,
    max_attempts: u32,
    mut attempt: F,
) -> Result<T, ConquestError>
where
    S: DocumentStore,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Staged<T>, ConquestError>>,
{
    let attempts = max_attempts.max(1);
    for n in 1..=attempts {
        let staged = match attempt().await {
            Ok(staged) => staged,
            Err(ConquestError::Conflict { key }) => {
                tracing::debug!(attempt = n, %key, "read conflict, retrying");
                continue;
            }
            Err(other) => return Err(other),
        };

        if staged.batch.is_empty() {
            return Ok(staged.value);
        }

        match store.commit(staged.batch).await {
            Ok(()) => return Ok(staged.value),
            Err(StoreError::Conflict { key }) => {
                tracing::debug!(attempt = n, %key, "commit conflict, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(ConquestError::ConflictRetry { attempts })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;
    use sovereign_types::{CellResource, CellType};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Versioned;

    /// Store whose commits always lose the race.
    struct AlwaysConflicting {
        inner: MemoryStore,
        commits: AtomicU32,
    }

    impl DocumentStore for AlwaysConflicting {
        async fn get_many(&self, keys: &[String]) -> Result<Vec<Versioned>, StoreError> {
            self.inner.get_many(keys).await
        }

        async fn commit(&self, _batch: CommitBatch) -> Result<(), StoreError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Conflict {
                key: "tiles/0_0".to_owned(),
            })
        }
    }

    fn plains(col: i32, row: i32) -> Cell {
        Cell::unowned(CellCoord::new(col, row), CellType::Plains, CellResource::Food)
    }

    #[tokio::test]
    async fn staged_writes_commit_with_read_versions() {
        let store = MemoryStore::new();
        let cell = plains(1, 1);

        let value = run_atomic(&store, 5, || async {
            let mut txn = Transaction::begin(&store);
            let read = txn.read_cells(&[cell.coord]).await?;
            assert!(read.first().unwrap().is_none());
            txn.write_cell(&cell)?;
            Ok(txn.finish(42))
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        let doc = store.get(&cell_key(cell.coord)).await.unwrap();
        assert_eq!(doc.version, 1);
    }

    #[tokio::test]
    async fn conflicts_exhaust_into_conflict_retry() {
        let store = AlwaysConflicting {
            inner: MemoryStore::new(),
            commits: AtomicU32::new(0),
        };
        let err = run_atomic(&store, 5, || async {
            let mut txn = Transaction::begin(&store);
            txn.write_cell(&plains(0, 0))?;
            Ok(txn.finish(()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ConquestError::ConflictRetry { attempts: 5 }));
        assert_eq!(store.commits.load(Ordering::SeqCst), 5);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn rejection_stops_immediately_without_writes() {
        let store = MemoryStore::new();
        let mut calls = 0_u32;
        let err = run_atomic(&store, 5, || {
            calls += 1;
            async {
                let mut txn = Transaction::begin(&store);
                txn.write_cell(&plains(0, 0))?;
                Err::<Staged<()>, _>(ConquestError::Validation {
                    message: "nope".to_owned(),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ConquestError::Validation { .. }));
        assert_eq!(calls, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn interleaved_writer_forces_a_retry() {
        let store = MemoryStore::new();
        let key = cell_key(CellCoord::new(0, 0));
        store.set(&key, serde_json::to_value(plains(0, 0)).unwrap()).await.unwrap();

        let mut calls = 0_u32;
        run_atomic(&store, 5, || {
            calls += 1;
            let first = calls == 1;
            let store = &store;
            let key = key.clone();
            async move {
                let mut txn = Transaction::begin(store);
                txn.read_cells(&[CellCoord::new(0, 0)]).await?;
                if first {
                    // Another writer lands between our read and commit.
                    let ocean = json!({
                        "coord": {"col": 0, "row": 0},
                        "owner": null,
                        "type": "ocean",
                        "resource": "none",
                    });
                    store.set(&key, ocean).await?;
                }
                let mut cell = plains(0, 0);
                cell.resource = CellResource::Gold;
                txn.write_cell(&cell)?;
                Ok(txn.finish(()))
            }
        })
        .await
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(store.get(&key).await.unwrap().version, 3);
    }
}
