//! Leaderboard entries and the locally cached leaderboard
//!
//! The shared leaderboard lives in a remote store; the last snapshot we saw
//! (plus anything we submitted since) is kept here so the board still works
//! offline. Persisted through the local key-value store as JSON.

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Best combo of the run
    pub combo: u32,
    /// Unix timestamp (ms) when submitted
    pub timestamp: f64,
}

/// Cached leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<LeaderboardEntry>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    LEADERBOARD_SIZE
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::with_capacity(LEADERBOARD_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Replace the cache with a fresh remote snapshot
    pub fn replace(&mut self, mut entries: Vec<LeaderboardEntry>) {
        // Stable sort keeps remote order among equal scores
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(self.capacity);
        self.entries = entries;
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new entry (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score, ties keep older first)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(self.capacity);

        Some(rank)
    }

    /// Top `n` entries
    pub fn top(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}
