//! Bounded local play and search history.
//!
//! Two JSON-encoded lists behind a small key/value repository, so the
//! eviction/dedup logic is testable independently of whatever storage a
//! platform provides. Both lists are advisory and may be absent or empty.

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::models::Track;

pub const PLAY_HISTORY_KEY: &str = "zuno_history";
pub const SEARCH_HISTORY_KEY: &str = "zuno_search_history";

/// Most recent entries kept, newest first.
pub const PLAY_HISTORY_CAP: usize = 50;
pub const SEARCH_HISTORY_CAP: usize = 20;

/// A play counts only after this many listened seconds; anything shorter
/// is an accidental or skipped play and would pollute the taste model.
pub const MIN_PLAY_SECONDS: u32 = 10;

/// Queries shorter than this are not worth remembering.
pub const MIN_QUERY_LEN: usize = 3;

/// Key/value persisted blob store holding the history lists.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// In-memory store. The default backend, and the one tests use.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Owner of the bounded history lists.
pub struct HistoryManager {
    store: Arc<dyn HistoryStore>,
    // Keeps each read-modify-write atomic with respect to itself, so
    // concurrent writers cannot truncate each other's updates.
    write_lock: Mutex<()>,
}

impl HistoryManager {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key).await {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    async fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<()> {
        self.store.set(key, serde_json::to_string(list)?).await
    }

    /// Record a completed play. Replaying a known track moves it to the
    /// front; the oldest entry beyond the cap is dropped.
    pub async fn record_play(&self, track: &Track, seconds_played: u32) -> Result<()> {
        if seconds_played < MIN_PLAY_SECONDS {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        let mut history: Vec<Track> = self.read_list(PLAY_HISTORY_KEY).await;
        history.retain(|t| t.id != track.id);
        history.insert(0, track.clone());
        history.truncate(PLAY_HISTORY_CAP);
        self.write_list(PLAY_HISTORY_KEY, &history).await
    }

    /// Play history, newest first.
    pub async fn recent_plays(&self) -> Vec<Track> {
        self.read_list(PLAY_HISTORY_KEY).await
    }

    pub async fn save_search(&self, query: &str) -> Result<()> {
        if query.len() < MIN_QUERY_LEN {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        let mut history: Vec<String> = self.read_list(SEARCH_HISTORY_KEY).await;
        history.retain(|q| !q.eq_ignore_ascii_case(query));
        history.insert(0, query.to_string());
        history.truncate(SEARCH_HISTORY_CAP);
        self.write_list(SEARCH_HISTORY_KEY, &history).await
    }

    pub async fn recent_searches(&self) -> Vec<String> {
        self.read_list(SEARCH_HISTORY_KEY).await
    }
}
