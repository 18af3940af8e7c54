//! Quiz questions
//!
//! A question is generic over its choice type: synthesized arithmetic yields
//! `i32` choices, the ratio bank yields `String` choices. The session stores
//! the tagged `Choice` union so answers compare by value and by kind.

use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::question_bank;
use crate::consts::CHOICE_COUNT;
use crate::rng::GameRng;
use crate::tuning::{QuizMode, Tuning};

/// A choice value shown on an answer button
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Number(i32),
    Text(String),
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::Number(n) => write!(f, "{n}"),
            Choice::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Choice {
    fn from(n: i32) -> Self {
        Choice::Number(n)
    }
}

impl From<String> for Choice {
    fn from(s: String) -> Self {
        Choice::Text(s)
    }
}

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "×",
        }
    }

    pub fn apply(&self, lhs: i32, rhs: i32) -> i32 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
        }
    }
}

/// Operands behind a synthesized question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub lhs: i32,
    pub rhs: i32,
    pub operator: Operator,
}

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question<T> {
    pub text: String,
    /// Display order; contains `correct` exactly once
    pub choices: Vec<T>,
    pub correct: T,
    #[serde(default)]
    pub operation: Option<Operation>,
}

impl<T: PartialEq> Question<T> {
    /// `None` (timed out) never matches
    pub fn is_correct(&self, answer: Option<&T>) -> bool {
        answer.is_some_and(|a| *a == self.correct)
    }

    /// Convert choice values, preserving order
    pub fn map_choices<U>(self, f: impl Fn(T) -> U) -> Question<U> {
        Question {
            text: self.text,
            choices: self.choices.into_iter().map(&f).collect(),
            correct: f(self.correct),
            operation: self.operation,
        }
    }
}

/// Produce the next question for the current score
pub fn generate(rng: &mut GameRng, score: u32, tuning: &Tuning) -> Question<Choice> {
    match tuning.quiz_mode {
        QuizMode::Arithmetic => arithmetic(rng, score, tuning).map_choices(Choice::from),
        QuizMode::RatioBank => question_bank::draw(rng).map_choices(Choice::from),
    }
}

/// Synthesize an arithmetic question scaled by score
pub fn arithmetic(rng: &mut GameRng, score: u32, tuning: &Tuning) -> Question<i32> {
    let difficulty = Difficulty::for_score(score, tuning);
    let level = difficulty.level;
    let range = difficulty.operand_range;

    let negative_chance = if score > tuning.negative_after_score {
        ((score - tuning.negative_after_score) as f32 * tuning.negative_chance_per_score)
            .min(tuning.negative_chance_max)
    } else {
        0.0
    };
    let use_negative = rng.chance(negative_chance);

    let lhs = draw_operand(rng, range, use_negative);
    let rhs = draw_operand(rng, range, use_negative);

    let roll = rng.unit();
    let operation = if level < tuning.mixed_ops_min_level || roll < tuning.addition_share {
        Operation {
            lhs,
            rhs,
            operator: Operator::Add,
        }
    } else if roll < tuning.subtraction_cutoff {
        Operation {
            lhs,
            rhs,
            operator: Operator::Sub,
        }
    } else {
        // Multiplication sticks to times-table operands
        Operation {
            lhs: rng.int_range(1, tuning.multiply_operand_max),
            rhs: rng.int_range(1, tuning.multiply_operand_max),
            operator: Operator::Mul,
        }
    };

    let correct = operation.operator.apply(operation.lhs, operation.rhs);
    Question {
        text: format!(
            "{} {} {} = ?",
            operand_text(operation.lhs),
            operation.operator.symbol(),
            operand_text(operation.rhs)
        ),
        choices: numeric_choices(rng, correct, tuning.distractor_offset),
        correct,
        operation: Some(operation),
    }
}

fn draw_operand(rng: &mut GameRng, range: i32, allow_negative: bool) -> i32 {
    let n = rng.int_range(0, range - 1);
    if allow_negative && rng.chance(0.5) { -n } else { n }
}

fn operand_text(n: i32) -> String {
    if n < 0 { format!("({n})") } else { n.to_string() }
}

/// Correct answer plus three unique nearby distractors, shuffled
pub fn numeric_choices(rng: &mut GameRng, correct: i32, offsets: (i32, i32)) -> Vec<i32> {
    let mut choices = Vec::with_capacity(CHOICE_COUNT);
    choices.push(correct);
    while choices.len() < CHOICE_COUNT {
        let offset = rng.int_range(offsets.0, offsets.1);
        if offset == 0 {
            continue;
        }
        let wrong = correct + offset;
        if !choices.contains(&wrong) {
            choices.push(wrong);
        }
    }
    rng.shuffle(&mut choices);
    choices
}
