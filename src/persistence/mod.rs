//! Persistence adapter
//!
//! Features:
//! - High score and player name in local storage
//! - Score submission to the shared leaderboard
//! - Top-N leaderboard fetch with a locally cached fallback
//!
//! Every failure is soft: it is logged and the game carries on with local
//! data.

pub mod store;

pub use store::{
    DeferredLeaderboard, KeyValueStore, LeaderboardStore, MemoryLeaderboard, MemoryStore,
    RemoteRequest, StoreError,
};

use crate::highscores::{HighScores, LeaderboardEntry};
use crate::platform;

pub const HIGH_SCORE_KEY: &str = "mathHighScore";
pub const PLAYER_NAME_KEY: &str = "mathPlayerName";
pub const LEADERBOARD_CACHE_KEY: &str = "mathLeaderboardCache";

/// What local storage remembers about the player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalProfile {
    pub high_score: u32,
    pub player_name: String,
}

/// Where a leaderboard came from
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Remote(Vec<LeaderboardEntry>),
    /// Remote failed; last known snapshot instead
    Cached(Vec<LeaderboardEntry>),
    /// Remote failed and nothing is cached
    Unavailable,
    /// Query handed to an asynchronous host
    Pending,
}

/// Local store, remote leaderboard and the offline cache
pub struct Persistence<K, L> {
    local: K,
    remote: L,
    cache: HighScores,
}

impl<K: KeyValueStore, L: LeaderboardStore> Persistence<K, L> {
    pub fn new(local: K, remote: L) -> Self {
        let cache = load_cache(&local);
        Self {
            local,
            remote,
            cache,
        }
    }

    /// Read high score and player name; missing or garbled values fall back
    /// to defaults
    pub fn load_local(&self) -> LocalProfile {
        let high_score = match self.local.get_item(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring unparsable high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("LocalStorage not available: {}", e);
                0
            }
        };
        let player_name = match self.local.get_item(PLAYER_NAME_KEY) {
            Ok(name) => name.unwrap_or_default(),
            Err(e) => {
                log::warn!("LocalStorage not available: {}", e);
                String::new()
            }
        };
        LocalProfile {
            high_score,
            player_name,
        }
    }

    /// Store the name, and the score if it beats the stored high score
    pub fn save_local(&mut self, score: u32, name: &str) {
        let current = self.load_local().high_score;
        if score > current {
            if let Err(e) = self.local.set_item(HIGH_SCORE_KEY, &score.to_string()) {
                log::warn!("Could not save high score: {}", e);
            } else {
                log::info!("New high score {}", score);
            }
        }
        if let Err(e) = self.local.set_item(PLAYER_NAME_KEY, name) {
            log::warn!("Could not save player name: {}", e);
        }
    }

    /// Append a finished run to the shared leaderboard.
    ///
    /// Returns false on failure, and also when the store defers the call;
    /// the host then reports the outcome through `complete_submit`.
    pub fn submit_score(&mut self, name: &str, score: u32, max_combo: u32) -> bool {
        let entry = LeaderboardEntry {
            name: name.to_string(),
            score,
            combo: max_combo,
            timestamp: platform::now_ms(),
        };
        let result = self.remote.append_score(&entry);
        self.complete_submit(entry, result)
    }

    /// Record the outcome of an append; only a stored entry joins the cache
    pub fn complete_submit(
        &mut self,
        entry: LeaderboardEntry,
        result: Result<String, StoreError>,
    ) -> bool {
        match result {
            Ok(id) => {
                log::info!("Score saved with ID: {}", id);
                self.cache.add(entry);
                self.store_cache();
                true
            }
            Err(StoreError::Deferred) => {
                log::debug!("Score submission for {} handed to host", entry.name);
                false
            }
            Err(e) => {
                log::warn!("Error submitting score: {}", e);
                false
            }
        }
    }

    /// Top `n` scores, falling back to the cached snapshot on failure
    pub fn fetch_top(&mut self, n: usize) -> FetchOutcome {
        let result = self.remote.query_top_scores(n);
        self.complete_fetch(n, result)
    }

    /// Record the outcome of a top-`n` query
    pub fn complete_fetch(
        &mut self,
        n: usize,
        result: Result<Vec<LeaderboardEntry>, StoreError>,
    ) -> FetchOutcome {
        match result {
            Ok(mut entries) => {
                entries.truncate(n);
                log::info!("Fetched {} leaderboard entries", entries.len());
                self.cache.replace(entries.clone());
                self.store_cache();
                FetchOutcome::Remote(entries)
            }
            Err(StoreError::Deferred) => FetchOutcome::Pending,
            Err(e) => {
                log::warn!("Error fetching leaderboard: {}", e);
                if self.cache.is_empty() {
                    FetchOutcome::Unavailable
                } else {
                    FetchOutcome::Cached(self.cache.top(n))
                }
            }
        }
    }

    pub fn cache(&self) -> &HighScores {
        &self.cache
    }

    pub fn local(&self) -> &K {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut K {
        &mut self.local
    }

    pub fn remote(&self) -> &L {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut L {
        &mut self.remote
    }

    fn store_cache(&mut self) {
        let result = serde_json::to_string(&self.cache)
            .map_err(StoreError::from)
            .and_then(|json| self.local.set_item(LEADERBOARD_CACHE_KEY, &json));
        if let Err(e) = result {
            log::warn!("Could not cache leaderboard: {}", e);
        }
    }
}

fn load_cache<K: KeyValueStore>(local: &K) -> HighScores {
    match local.get_item(LEADERBOARD_CACHE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<HighScores>(&json) {
            Ok(cache) => {
                log::info!("Loaded {} cached leaderboard entries", cache.entries.len());
                cache
            }
            Err(e) => {
                log::warn!("Discarding corrupt leaderboard cache: {}", e);
                HighScores::new()
            }
        },
        Ok(None) => HighScores::new(),
        Err(e) => {
            log::warn!("LocalStorage not available: {}", e);
            HighScores::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persistence() -> Persistence<MemoryStore, MemoryLeaderboard> {
        Persistence::new(MemoryStore::new(), MemoryLeaderboard::new())
    }

    #[test]
    fn test_load_local_defaults() {
        assert_eq!(persistence().load_local(), LocalProfile::default());
    }

    #[test]
    fn test_save_local_only_raises_high_score() {
        let mut p = persistence();
        p.save_local(7, "Nok");
        p.save_local(3, "Nok");
        let profile = p.load_local();
        assert_eq!(profile.high_score, 7);
        assert_eq!(profile.player_name, "Nok");
        p.save_local(9, "Ploy");
        assert_eq!(
            p.load_local(),
            LocalProfile {
                high_score: 9,
                player_name: "Ploy".to_string()
            }
        );
    }

    #[test]
    fn test_garbled_high_score_ignored() {
        let mut store = MemoryStore::new();
        store.set_item(HIGH_SCORE_KEY, "lots").expect("memory");
        let p = Persistence::new(store, MemoryLeaderboard::new());
        assert_eq!(p.load_local().high_score, 0);
    }

    #[test]
    fn test_submit_and_fetch() {
        let mut p = persistence();
        assert!(p.submit_score("Nok", 5, 3));
        assert!(p.submit_score("Ploy", 8, 2));
        assert_eq!(p.cache().top_score(), Some(8));
        match p.fetch_top(10) {
            FetchOutcome::Remote(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].name, "Ploy");
                assert_eq!(entries[1].combo, 3);
            }
            other => panic!("expected remote, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_fails_soft_when_offline() {
        let mut p = persistence();
        p.remote_mut().offline = true;
        assert!(!p.submit_score("Nok", 5, 1));
        assert_eq!(p.fetch_top(10), FetchOutcome::Unavailable);
    }

    #[test]
    fn test_fetch_falls_back_to_cache() {
        let mut p = persistence();
        p.submit_score("Nok", 5, 1);
        p.fetch_top(10);
        p.remote_mut().offline = true;
        match p.fetch_top(10) {
            FetchOutcome::Cached(entries) => assert_eq!(entries[0].score, 5),
            other => panic!("expected cache, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_survives_reload() {
        let mut p = persistence();
        p.submit_score("Nok", 4, 2);
        let local = p.local().clone();
        let mut reloaded = Persistence::new(
            local,
            MemoryLeaderboard {
                offline: true,
                ..Default::default()
            },
        );
        assert!(matches!(reloaded.fetch_top(10), FetchOutcome::Cached(_)));
    }

    #[test]
    fn test_deferred_submit_waits_for_host() {
        let mut p = Persistence::new(MemoryStore::new(), DeferredLeaderboard::new());
        assert!(!p.submit_score("Nok", 6, 2));
        assert!(p.cache().is_empty());

        let requests = p.remote_mut().take_requests();
        let [RemoteRequest::Submit(entry)] = requests.as_slice() else {
            panic!("expected one submit, got {:?}", requests);
        };
        assert!(!p.complete_submit(entry.clone(), Err(StoreError::Transport("rejected".into()))));
        assert!(p.cache().is_empty());
        assert!(p.complete_submit(entry.clone(), Ok("doc-1".to_string())));
        assert_eq!(p.cache().top_score(), Some(6));
    }

    #[test]
    fn test_deferred_fetch_pending_then_settles() {
        let mut p = Persistence::new(MemoryStore::new(), DeferredLeaderboard::new());
        assert_eq!(p.fetch_top(5), FetchOutcome::Pending);
        assert_eq!(
            p.remote_mut().take_requests(),
            [RemoteRequest::Fetch { limit: 5 }]
        );
        let entry = LeaderboardEntry {
            name: "Ploy".to_string(),
            score: 3,
            combo: 1,
            timestamp: 0.0,
        };
        assert_eq!(
            p.complete_fetch(5, Ok(vec![entry.clone()])),
            FetchOutcome::Remote(vec![entry.clone()])
        );
        assert_eq!(
            p.complete_fetch(5, Err(StoreError::Transport("timeout".into()))),
            FetchOutcome::Cached(vec![entry])
        );
    }
}
