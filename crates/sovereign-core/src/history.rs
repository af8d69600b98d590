//! Outbound history: per-nation log entries and global news.
//!
//! The engine appends to a [`HistorySink`] only after a transaction has
//! committed. Sink failures never undo or change a committed action.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use sovereign_types::{LogEntry, NationId, NewsEvent};
use tokio::sync::Mutex;

/// Errors raised by a history sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The backing service could not be reached.
    #[error("history sink unavailable: {message}")]
    Unavailable {
        /// Backend description.
        message: String,
    },

    /// A record could not be encoded or decoded.
    #[error("history record encoding failed: {source}")]
    Encoding {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}

/// Append-only store for log entries and news.
pub trait HistorySink: Send + Sync {
    /// Append an entry to its actor's log.
    fn append_log(&self, entry: &LogEntry) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Publish a global news event.
    fn publish_news(&self, event: &NewsEvent)
    -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Most recent log entries for a nation, newest first.
    fn recent_logs(
        &self,
        nation: NationId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<LogEntry>, SinkError>> + Send;

    /// Most recent news, newest first.
    fn recent_news(&self, limit: usize)
    -> impl Future<Output = Result<Vec<NewsEvent>, SinkError>> + Send;
}

#[derive(Debug, Default)]
struct HistoryState {
    logs: BTreeMap<NationId, Vec<LogEntry>>,
    news: Vec<NewsEvent>,
}

/// In-process history. Clones share the same lists.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    state: Arc<Mutex<HistoryState>>,
}

impl MemoryHistory {
    /// Create empty history.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistorySink for MemoryHistory {
    async fn append_log(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut state = self.state.lock().await;
        state
            .logs
            .entry(entry.actor)
            .or_default()
            .insert(0, entry.clone());
        Ok(())
    }

    async fn publish_news(&self, event: &NewsEvent) -> Result<(), SinkError> {
        self.state.lock().await.news.insert(0, event.clone());
        Ok(())
    }

    async fn recent_logs(&self, nation: NationId, limit: usize) -> Result<Vec<LogEntry>, SinkError> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .get(&nation)
            .map(|logs| logs.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_news(&self, limit: usize) -> Result<Vec<NewsEvent>, SinkError> {
        let state = self.state.lock().await;
        Ok(state.news.iter().take(limit).cloned().collect())
    }
}
