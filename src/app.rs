//! Session host
//!
//! Owns one `GameState` plus its collaborators. After every command or clock
//! advance the queued simulation events are drained and turned into storage
//! calls and sound cues, so the simulation itself never waits on I/O.

use serde::Serialize;

use crate::highscores::LeaderboardEntry;
use crate::persistence::{FetchOutcome, KeyValueStore, LeaderboardStore, Persistence, StoreError};
use crate::settings::Settings;
use crate::sim::{
    Command, GameEvent, GamePhase, GameState, Snapshot, advance, handle_command, set_leaderboard,
};
use crate::tuning::{Tuning, TuningPreset};

/// Sounds the host audio layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    Collect,
    Correct,
    Wrong,
    Hit,
    GameOver,
}

pub struct App<K, L> {
    state: GameState,
    persistence: Persistence<K, L>,
    settings: Settings,
    sounds: Vec<SoundCue>,
}

impl<K: KeyValueStore, L: LeaderboardStore> App<K, L> {
    /// Session using the rule set stored in settings
    pub fn new(local: K, remote: L, seed: u64) -> Self {
        let settings = Settings::load(&local);
        let tuning = settings.preset.tuning();
        Self::build(Persistence::new(local, remote), settings, seed, tuning)
    }

    /// Session with an explicit balance table (overrides the stored preset)
    pub fn with_tuning(local: K, remote: L, seed: u64, tuning: Tuning) -> Self {
        let settings = Settings::load(&local);
        Self::build(Persistence::new(local, remote), settings, seed, tuning)
    }

    fn build(
        persistence: Persistence<K, L>,
        settings: Settings,
        seed: u64,
        tuning: Tuning,
    ) -> Self {
        let profile = persistence.load_local();
        let mut state = GameState::new(seed, tuning);
        state.scores.high_score = profile.high_score;
        state.player_name = profile.player_name;
        log::info!(
            "Session ready (seed {}, high score {})",
            state.rng.seed(),
            state.scores.high_score
        );
        Self {
            state,
            persistence,
            settings,
            sounds: Vec::new(),
        }
    }

    /// Apply a player command. Returns false when the current phase ignores it.
    pub fn command(&mut self, command: Command) -> bool {
        if command == Command::ToggleSound {
            let on = self.settings.toggle_sound();
            log::info!("Sound {}", if on { "on" } else { "off" });
            if !on {
                self.sounds.clear();
            }
            self.settings.save(self.persistence.local_mut());
            return true;
        }
        let accepted = handle_command(&mut self.state, command);
        self.process_events();
        accepted
    }

    /// Advance the session clock by `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        advance(&mut self.state, dt_ms);
        self.process_events();
    }

    /// Switch rule set; only on the title screen so a run never changes rules
    pub fn set_preset(&mut self, preset: TuningPreset) -> bool {
        if self.state.phase != GamePhase::Start {
            return false;
        }
        self.settings.preset = preset;
        self.state.tuning = preset.tuning();
        self.settings.save(self.persistence.local_mut());
        log::info!("Preset set to {}", preset.as_str());
        true
    }

    /// Settle a score submission the host performed asynchronously
    pub fn complete_submit(
        &mut self,
        entry: LeaderboardEntry,
        result: Result<String, StoreError>,
    ) -> bool {
        self.persistence.complete_submit(entry, result)
    }

    /// Settle a leaderboard query the host performed asynchronously
    pub fn complete_fetch(&mut self, result: Result<Vec<LeaderboardEntry>, StoreError>) {
        let outcome = self
            .persistence
            .complete_fetch(self.settings.leaderboard_size, result);
        self.show_leaderboard(outcome);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.settings.sound_enabled)
    }

    /// Hand over queued sound cues
    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn persistence(&self) -> &Persistence<K, L> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut Persistence<K, L> {
        &mut self.persistence
    }

    fn process_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::SessionStarted { name } => {
                    self.persistence.save_local(0, &name);
                }
                GameEvent::GameOver {
                    name,
                    score,
                    max_combo,
                } => {
                    self.persistence.save_local(score, &name);
                    self.state.scores.high_score = self
                        .state
                        .scores
                        .high_score
                        .max(self.persistence.load_local().high_score);
                    self.persistence.submit_score(&name, score, max_combo);
                    self.cue(SoundCue::GameOver);
                }
                GameEvent::LeaderboardRequested => {
                    let outcome = self.persistence.fetch_top(self.settings.leaderboard_size);
                    self.show_leaderboard(outcome);
                }
                GameEvent::CollectibleTaken { .. } => self.cue(SoundCue::Collect),
                GameEvent::AnswerResolved { correct, .. } => self.cue(if correct {
                    SoundCue::Correct
                } else {
                    SoundCue::Wrong
                }),
                GameEvent::PlayerHit { .. } => self.cue(SoundCue::Hit),
                GameEvent::QuestionAsked { .. } | GameEvent::EnemySpawned { .. } => {}
            }
        }
    }

    fn show_leaderboard(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Remote(entries) => set_leaderboard(&mut self.state, entries),
            FetchOutcome::Cached(entries) if !entries.is_empty() => {
                log::info!("Showing cached leaderboard");
                set_leaderboard(&mut self.state, entries);
            }
            FetchOutcome::Cached(_) | FetchOutcome::Unavailable => {
                log::warn!(
                    "Leaderboard unavailable, keeping {} entries",
                    self.state.leaderboard.len()
                );
            }
            FetchOutcome::Pending => log::debug!("Leaderboard fetch in flight"),
        }
    }

    fn cue(&mut self, sound: SoundCue) {
        if self.settings.sound_enabled {
            self.sounds.push(sound);
        }
    }
}
