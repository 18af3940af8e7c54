//! Game settings and preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;
use crate::persistence::KeyValueStore;
use crate::tuning::TuningPreset;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play sound cues
    pub sound_enabled: bool,
    /// Rule set for new sessions
    pub preset: TuningPreset,
    /// Rows fetched for the leaderboard screen
    pub leaderboard_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            preset: TuningPreset::default(),
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "mathSettings";

    /// Load settings, falling back to defaults on any failure
    pub fn load<K: KeyValueStore>(store: &K) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    settings.leaderboard_size = settings.leaderboard_size.max(1);
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring corrupt settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("LocalStorage not available: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save<K: KeyValueStore>(&self, store: &mut K) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not encode settings: {}", e),
        }
    }

    /// Flip sound on/off, returning the new value
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }
}
