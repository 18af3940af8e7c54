//! Storage collaborators
//!
//! `KeyValueStore` is the browser's localStorage contract; `LeaderboardStore`
//! is the shared score collection (a generic document store with an append
//! and a top-N query). In-memory versions back native runs and tests.
//! `DeferredLeaderboard` queues calls for a host whose document store is
//! asynchronous; the host reports each result back once it settles.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::highscores::LeaderboardEntry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage quota exceeded: {0}")]
    Quota(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Handed to an asynchronous host; the result arrives later
    #[error("request deferred to the host")]
    Deferred,
}

/// Persistent string key-value store
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Remote score collection
pub trait LeaderboardStore {
    /// Append a record; returns the new document ID
    fn append_score(&mut self, entry: &LeaderboardEntry) -> Result<String, StoreError>;
    /// Top `limit` records by score, highest first
    fn query_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// HashMap-backed key-value store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// In-process leaderboard with an offline switch
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    pub(super) records: Vec<(String, LeaderboardEntry)>,
    pub(super) next_id: u64,
    /// When set, every call fails with a transport error
    pub offline: bool,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn append_score(&mut self, entry: &LeaderboardEntry) -> Result<String, StoreError> {
        if self.offline {
            return Err(StoreError::Transport("leaderboard offline".to_string()));
        }
        self.next_id += 1;
        let id = format!("score-{}", self.next_id);
        self.records.push((id.clone(), entry.clone()));
        Ok(id)
    }

    fn query_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if self.offline {
            return Err(StoreError::Transport("leaderboard offline".to_string()));
        }
        let mut entries: Vec<LeaderboardEntry> =
            self.records.iter().map(|(_, e)| e.clone()).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Leaderboard call waiting for an asynchronous host
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    Submit(LeaderboardEntry),
    Fetch { limit: usize },
}

/// Leaderboard that records every call instead of performing it
#[derive(Debug, Clone, Default)]
pub struct DeferredLeaderboard {
    requests: RefCell<Vec<RemoteRequest>>,
}

impl DeferredLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the queued calls, oldest first
    pub fn take_requests(&mut self) -> Vec<RemoteRequest> {
        self.requests.take()
    }
}

impl LeaderboardStore for DeferredLeaderboard {
    fn append_score(&mut self, entry: &LeaderboardEntry) -> Result<String, StoreError> {
        self.requests
            .get_mut()
            .push(RemoteRequest::Submit(entry.clone()));
        Err(StoreError::Deferred)
    }

    fn query_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.requests
            .borrow_mut()
            .push(RemoteRequest::Fetch { limit });
        Err(StoreError::Deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: "Nok".to_string(),
            score,
            combo: 1,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get_item("k").expect("memory").is_none());
        store.set_item("k", "v").expect("memory");
        assert_eq!(store.get_item("k").expect("memory").as_deref(), Some("v"));
    }

    #[test]
    fn test_leaderboard_query_sorted_and_limited() {
        let mut board = MemoryLeaderboard::new();
        for s in [3, 9, 1, 7] {
            board.append_score(&entry(s)).expect("online");
        }
        let top: Vec<_> = board
            .query_top_scores(3)
            .expect("online")
            .iter()
            .map(|e| e.score)
            .collect();
        assert_eq!(top, [9, 7, 3]);
    }

    #[test]
    fn test_offline_fails() {
        let mut board = MemoryLeaderboard {
            offline: true,
            ..Default::default()
        };
        assert!(matches!(
            board.append_score(&entry(1)),
            Err(StoreError::Transport(_))
        ));
        assert!(board.query_top_scores(10).is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn test_deferred_queues_in_order() {
        let mut board = DeferredLeaderboard::new();
        assert!(matches!(
            board.append_score(&entry(4)),
            Err(StoreError::Deferred)
        ));
        assert!(matches!(
            board.query_top_scores(10),
            Err(StoreError::Deferred)
        ));
        assert_eq!(
            board.take_requests(),
            [
                RemoteRequest::Submit(entry(4)),
                RemoteRequest::Fetch { limit: 10 }
            ]
        );
        assert!(board.take_requests().is_empty());
    }
}
