//! `Dragonfly` (Redis-compatible) history lists.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `nation:{id}:logs` | List | Log entries for one nation, newest first |
//! | `news:war` | List | War news, newest first |
//!
//! Lists are capped so a long-running world does not grow them without
//! bound.

use fred::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sovereign_core::{HistorySink, SinkError};
use sovereign_types::{LogEntry, NationId, NewsEvent};

use crate::error::DbError;

/// Key of the global war news list.
pub const NEWS_KEY: &str = "news:war";

/// Default number of entries kept per list.
const DEFAULT_MAX_ENTRIES: i64 = 500;

/// Key of a nation's log list.
pub fn log_key(nation: NationId) -> String {
    format!("nation:{nation}:logs")
}

/// [`HistorySink`] backed by `Dragonfly` lists.
#[derive(Clone)]
pub struct DragonflyHistory {
    client: Client,
    max_entries: i64,
}

impl DragonflyHistory {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self {
            client,
            max_entries: DEFAULT_MAX_ENTRIES,
        })
    }

    /// Keep at most `max` entries per list.
    #[must_use]
    pub fn with_max_entries(mut self, max: i64) -> Self {
        self.max_entries = max.max(1);
        self
    }

    /// Push `value` onto the head of `key` and trim the tail.
    async fn push<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: u64 = self.client.lpush(key, json.as_str()).await?;
        let _: () = self
            .client
            .ltrim(key, 0, self.max_entries.saturating_sub(1))
            .await?;
        Ok(())
    }

    /// Read up to `limit` entries from the head of `key`.
    async fn head<T: DeserializeOwned>(&self, key: &str, limit: usize) -> Result<Vec<T>, DbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = i64::try_from(limit).unwrap_or(i64::MAX).saturating_sub(1);
        let values: Vec<String> = self.client.lrange(key, 0, stop).await?;
        let mut entries = Vec::with_capacity(values.len());
        for v in &values {
            entries.push(serde_json::from_str(v)?);
        }
        Ok(entries)
    }
}

impl core::fmt::Debug for DragonflyHistory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragonflyHistory")
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl HistorySink for DragonflyHistory {
    async fn append_log(&self, entry: &LogEntry) -> Result<(), SinkError> {
        Ok(self.push(&log_key(entry.actor), entry).await?)
    }

    async fn publish_news(&self, event: &NewsEvent) -> Result<(), SinkError> {
        Ok(self.push(NEWS_KEY, event).await?)
    }

    async fn recent_logs(&self, nation: NationId, limit: usize) -> Result<Vec<LogEntry>, SinkError> {
        Ok(self.head(&log_key(nation), limit).await?)
    }

    async fn recent_news(&self, limit: usize) -> Result<Vec<NewsEvent>, SinkError> {
        Ok(self.head(NEWS_KEY, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keys_are_namespaced_per_nation() {
        let id = NationId::new();
        assert_eq!(log_key(id), format!("nation:{id}:logs"));
        assert_ne!(log_key(id), log_key(NationId::new()));
    }
}
