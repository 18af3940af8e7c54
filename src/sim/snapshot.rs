//! Read-only view handed to the renderer after every mutation

use glam::Vec2;
use serde::Serialize;

use super::quiz::Choice;
use super::state::{AnswerResult, Enemy, GamePhase, GameState, Obstacle, Player};
use crate::highscores::LeaderboardEntry;

/// Question as displayed; the answer is only revealed with the result
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub choices: Vec<Choice>,
    pub time_left: u32,
    pub result: Option<AnswerResult>,
    pub correct: Option<Choice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player_name: String,
    pub player: Player,
    pub collectible: Vec2,
    pub obstacles: Vec<Obstacle>,
    pub enemies: Vec<Enemy>,
    pub question: Option<QuestionView>,
    pub score: u32,
    pub high_score: u32,
    pub hearts: u8,
    pub combo: u32,
    pub max_combo: u32,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub sound_enabled: bool,
}

impl Snapshot {
    pub fn capture(state: &GameState, sound_enabled: bool) -> Self {
        let question = state.quiz.as_ref().map(|quiz| QuestionView {
            text: quiz.question.text.clone(),
            choices: quiz.question.choices.clone(),
            time_left: quiz.time_left,
            result: quiz.result.clone(),
            correct: quiz
                .result
                .as_ref()
                .map(|_| quiz.question.correct.clone()),
        });

        Self {
            phase: state.phase,
            player_name: state.player_name.clone(),
            player: state.player.clone(),
            collectible: state.collectible.pos,
            obstacles: state.obstacles.clone(),
            enemies: state.enemies.clone(),
            question,
            score: state.scores.score,
            high_score: state.scores.high_score,
            hearts: state.scores.hearts,
            combo: state.scores.combo,
            max_combo: state.scores.max_combo,
            leaderboard: state.leaderboard.clone(),
            sound_enabled,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
