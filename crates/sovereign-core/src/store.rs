//! The territory store interface.
//!
//! Cells and nations persist as versioned JSON documents under string keys.
//! A reader captures each document's version; a commit names the versions it
//! read and is refused with [`StoreError::Conflict`] if any of them moved.
//! This is the optimistic concurrency primitive the transaction runner in
//! [`crate::atomic`] is built on.
//!
//! Version `0` means "document does not exist". Committing a write against an
//! expected version of `0` therefore asserts the document is still absent.

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;
use sovereign_types::{CellCoord, NationId};

/// Storage key of a cell document.
pub fn cell_key(coord: CellCoord) -> String {
    format!("tiles/{}", coord.key())
}

/// Storage key of a nation document.
pub fn nation_key(id: NationId) -> String {
    format!("nations/{id}")
}

/// Errors surfaced by a [`DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document named in a commit changed after it was read.
    #[error("version conflict on `{key}`")]
    Conflict {
        /// The first key found to have moved.
        key: String,
    },

    /// The backing store could not be reached or failed the request.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Backend-specific description.
        message: String,
    },

    /// A stored document could not be decoded or encoded.
    #[error("corrupt document `{key}`: {source}")]
    Corrupt {
        /// Key of the offending document.
        key: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}

/// A document as read, with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// Document key.
    pub key: String,
    /// Version at read time. `0` when absent.
    pub version: u64,
    /// Document body. `None` when absent.
    pub body: Option<Value>,
}

/// A set of writes guarded by the versions they were derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitBatch {
    /// Every document the decision depended on, with the version seen.
    pub expected: BTreeMap<String, u64>,
    /// Documents to write. Each write bumps the document's version.
    pub writes: BTreeMap<String, Value>,
}

impl CommitBatch {
    /// Whether the batch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Versioned document storage with atomic multi-key commits.
///
/// Implementations must apply a [`CommitBatch`] all-or-nothing: either every
/// expected version matches and every write lands, or nothing changes.
pub trait DocumentStore: Send + Sync {
    /// Read several documents in one round trip.
    ///
    /// Returns one entry per requested key, in request order. Missing
    /// documents come back with version `0` and no body.
    fn get_many(
        &self,
        keys: &[String],
    ) -> impl Future<Output = Result<Vec<Versioned>, StoreError>> + Send;

    /// Apply `batch` if every expected version still holds.
    fn commit(&self, batch: CommitBatch) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read one document.
    fn get(&self, key: &str) -> impl Future<Output = Result<Versioned, StoreError>> + Send {
        let keys = vec![key.to_owned()];
        async move {
            let mut docs = self.get_many(&keys).await?;
            docs.pop().ok_or_else(|| StoreError::Unavailable {
                message: String::from("store returned no row for a requested key"),
            })
        }
    }

    /// Write one document unconditionally.
    fn set(&self, key: &str, body: Value) -> impl Future<Output = Result<(), StoreError>> + Send {
        let mut batch = CommitBatch::default();
        batch.writes.insert(key.to_owned(), body);
        self.commit(batch)
    }
}
