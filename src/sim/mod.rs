//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `advance`
//! - Seeded RNG only
//! - No rendering, audio, storage or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod enemy;
pub mod placement;
pub mod question_bank;
pub mod quiz;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{MoveOutcome, resolve_move};
pub use difficulty::Difficulty;
pub use quiz::{Choice, Operator, Question};
pub use snapshot::Snapshot;
pub use state::{
    AnswerResult, Collectible, Direction, Enemy, Facing, GameEvent, GamePhase, GameState,
    Obstacle, Player, QuizState, ScoreState,
};
pub use tick::{Command, advance, handle_command, set_leaderboard};
pub use timers::{TimerKind, Timers};
