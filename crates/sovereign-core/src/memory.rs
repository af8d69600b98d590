//! In-process [`DocumentStore`] backed by a map behind a tokio mutex.
//!
//! Used by tests and by single-process deployments that do not need
//! durability. Commits hold the lock for the whole check-and-write, so they
//! are trivially atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::store::{CommitBatch, DocumentStore, StoreError, Versioned};

/// Shared in-memory document map. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<BTreeMap<String, (u64, Value)>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.lock().await.is_empty()
    }

    /// Copy of every document body, keyed by document key.
    pub async fn snapshot(&self) -> BTreeMap<String, Value> {
        self.docs
            .lock()
            .await
            .iter()
            .map(|(k, (_, v))| (k.clone(), v.clone()))
            .collect()
    }
}

impl DocumentStore for MemoryStore {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Versioned>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(keys
            .iter()
            .map(|key| match docs.get(key) {
                Some((version, body)) => Versioned {
                    key: key.clone(),
                    version: *version,
                    body: Some(body.clone()),
                },
                None => Versioned {
                    key: key.clone(),
                    version: 0,
                    body: None,
                },
            })
            .collect())
    }

    async fn commit(&self, batch: CommitBatch) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        for (key, expected) in &batch.expected {
            let current = docs.get(key).map_or(0, |(v, _)| *v);
            if current != *expected {
                return Err(StoreError::Conflict { key: key.clone() });
            }
        }
        for (key, body) in batch.writes {
            let next = docs.get(&key).map_or(1, |(v, _)| v.saturating_add(1));
            docs.insert(key, (next, body));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn missing_documents_read_as_version_zero() {
        let store = MemoryStore::new();
        let doc = store.get("tiles/0_0").await.unwrap();
        assert_eq!(doc.version, 0);
        assert!(doc.body.is_none());
    }

    #[tokio::test]
    async fn writes_bump_versions() {
        let store = MemoryStore::new();
        store.set("a", json!({"n": 1})).await.unwrap();
        store.set("a", json!({"n": 2})).await.unwrap();
        let doc = store.get("a").await.unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.body, Some(json!({"n": 2})));
    }

    #[tokio::test]
    async fn stale_commit_is_refused_without_partial_writes() {
        let store = MemoryStore::new();
        store.set("a", json!(1)).await.unwrap();

        let mut batch = CommitBatch::default();
        batch.expected.insert("a".to_owned(), 0);
        batch.writes.insert("a".to_owned(), json!(2));
        batch.writes.insert("b".to_owned(), json!(3));

        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref key } if key == "a"));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("a").await.unwrap().body, Some(json!(1)));
    }

    #[tokio::test]
    async fn expecting_absence_guards_creation() {
        let store = MemoryStore::new();
        let mut first = CommitBatch::default();
        first.expected.insert("n".to_owned(), 0);
        first.writes.insert("n".to_owned(), json!("first"));
        let second = first.clone();

        store.commit(first).await.unwrap();
        assert!(store.commit(second).await.is_err());
    }

    #[tokio::test]
    async fn get_many_preserves_request_order() {
        let store = MemoryStore::new();
        store.set("b", json!("B")).await.unwrap();
        let keys = vec!["c".to_owned(), "b".to_owned(), "a".to_owned()];
        let docs = store.get_many(&keys).await.unwrap();
        let got: Vec<_> = docs.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(got, ["c", "b", "a"]);
        assert_eq!(docs.get(1).unwrap().version, 1);
    }
}
