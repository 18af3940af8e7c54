//! Game state and core simulation types
//!
//! One `GameState` owns everything a session mutates. Subsystems borrow it
//! (or pieces of it) instead of reading ambient globals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::quiz::{Choice, Question};
use super::timers::Timers;
use crate::consts::*;
use crate::highscores::LeaderboardEntry;
use crate::rng::GameRng;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a player name
    Start,
    /// Walking around the arena
    Playing,
    /// Answering a question
    Quiz,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
    /// Browsing the shared leaderboard
    Leaderboard,
}

/// Movement command direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which way the character sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub facing: Facing,
    /// Walking animation flag, cleared shortly after the last step
    pub moving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            facing: Facing::Right,
            moving: false,
        }
    }
}

/// The fruit the player walks into to trigger a question
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
}

/// A rock that blocks movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
}

/// A roaming enemy that chases the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Units advanced per steering tick, fixed at spawn
    pub speed: f32,
}

/// Score, lives and combo bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u32,
    pub high_score: u32,
    pub hearts: u8,
    pub combo: u32,
    pub max_combo: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            score: 0,
            high_score: 0,
            hearts: MAX_HEARTS,
            combo: 0,
            max_combo: 0,
        }
    }
}

impl ScoreState {
    /// Reset for a new run (high score survives)
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.hearts = MAX_HEARTS;
        self.combo = 0;
        self.max_combo = 0;
    }

    pub fn record_correct(&mut self) {
        self.score += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    /// Returns hearts remaining
    pub fn record_wrong(&mut self) -> u8 {
        self.combo = 0;
        self.lose_heart()
    }

    /// Returns hearts remaining
    pub fn lose_heart(&mut self) -> u8 {
        self.hearts = self.hearts.saturating_sub(1);
        self.hearts
    }
}

/// Outcome shown after an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// `None` when the timer ran out
    pub selected: Option<Choice>,
    pub correct: bool,
}

/// The question currently on screen
#[derive(Debug, Clone)]
pub struct QuizState {
    pub question: Question<Choice>,
    /// Whole seconds left on the countdown
    pub time_left: u32,
    /// Set once the question is resolved; blocks further answers
    pub result: Option<AnswerResult>,
}

/// Things the outside world may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted { name: String },
    CollectibleTaken { at: Vec2 },
    QuestionAsked { time_limit: u32 },
    AnswerResolved { correct: bool, timed_out: bool },
    PlayerHit { hearts: u8 },
    EnemySpawned { id: u32 },
    GameOver { name: String, score: u32, max_combo: u32 },
    LeaderboardRequested,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session RNG
    pub rng: GameRng,
    /// Balance table for this session
    pub tuning: Tuning,
    /// Current phase
    pub phase: GamePhase,
    /// Name entered on the title screen
    pub player_name: String,
    pub player: Player,
    pub collectible: Collectible,
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    /// Present exactly while in `Quiz`
    pub quiz: Option<QuizState>,
    pub scores: ScoreState,
    /// Last leaderboard snapshot handed to us
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Pending scheduled effects
    pub timers: Timers,
    /// Hearts hit zero in `Playing`; waiting for the delayed game over
    pub ending: bool,
    /// Events not yet drained by the host
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session on the title screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            rng: GameRng::new(seed),
            tuning,
            phase: GamePhase::Start,
            player_name: String::new(),
            player: Player::default(),
            collectible: Collectible {
                pos: Vec2::new(70.0, 30.0),
            },
            obstacles: Vec::new(),
            enemies: Vec::new(),
            quiz: None,
            scores: ScoreState::default(),
            leaderboard: Vec::new(),
            timers: Timers::default(),
            ending: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue an event for the host
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand over all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current session clock
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }
}
