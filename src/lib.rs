//! Math Adventure - A fruit-collecting arcade game with math quizzes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, enemies, quiz, state machine)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Local storage and remote leaderboard adapter
//! - `platform`: Browser/native platform abstraction
//! - `app`: Wires the simulation to persistence, settings and sound cues

pub mod app;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod rng;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{App, SoundCue};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{EnemyOnHit, QuizMode, Tuning, TuningPreset};

/// Game configuration constants
pub mod consts {
    /// Arena coordinates are percentages of the visible play field
    pub const ARENA_SIZE: f32 = 100.0;
    /// Player spawn point (arena center)
    pub const PLAYER_SPAWN: (f32, f32) = (50.0, 50.0);

    /// Starting (and maximum) hearts
    pub const MAX_HEARTS: u8 = 3;
    /// Choices per quiz question
    pub const CHOICE_COUNT: usize = 4;
    /// Correct answers needed per difficulty level
    pub const SCORE_PER_LEVEL: u32 = 3;

    /// Quiz countdown period
    pub const QUIZ_COUNTDOWN_MS: u64 = 1000;
    /// How long the walking animation flag stays set after a step
    pub const MOVEMENT_SETTLE_MS: u64 = 100;

    /// Default number of leaderboard rows fetched
    pub const LEADERBOARD_SIZE: usize = 10;
}
