//! Data-driven game balance
//!
//! The game shipped in a few near-identical variants whose radii, speeds and
//! timings differ slightly. Every such constant lives in `Tuning`, and each
//! known variant is a `TuningPreset`.

use serde::{Deserialize, Serialize};

/// What happens to an enemy after it touches the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnemyOnHit {
    /// Remove the enemy from the arena
    #[default]
    Despawn,
    /// Knock the enemy back to a far edge and keep chasing
    Respawn,
}

/// Where quiz questions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Synthesized arithmetic scaled by score
    #[default]
    Arithmetic,
    /// Fixed bank of ratio word problems
    RatioBank,
}

/// Named variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TuningPreset {
    /// Fruit, rocks and roaming enemies
    #[default]
    Garden,
    /// Faster enemies that bounce back and keep chasing
    Chase,
    /// Fruit and quizzes only
    Classic,
    /// Garden rules with ratio word problems
    Ratio,
}

impl TuningPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuningPreset::Garden => "Garden",
            TuningPreset::Chase => "Chase",
            TuningPreset::Classic => "Classic",
            TuningPreset::Ratio => "Ratio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "garden" => Some(TuningPreset::Garden),
            "chase" | "knockback" => Some(TuningPreset::Chase),
            "classic" => Some(TuningPreset::Classic),
            "ratio" => Some(TuningPreset::Ratio),
            _ => None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            TuningPreset::Garden => Tuning::default(),
            TuningPreset::Chase => Tuning::chase(),
            TuningPreset::Classic => Tuning::classic(),
            TuningPreset::Ratio => Tuning::ratio(),
        }
    }
}

/// Linear ramp `base + per_step * steps`, capped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub base: f32,
    pub per_step: f32,
    pub cap: f32,
}

impl Ramp {
    pub fn at(&self, steps: u32) -> f32 {
        (self.base + self.per_step * steps as f32).min(self.cap)
    }
}

/// Full balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Displacement per movement command
    pub move_step: f32,
    /// Lower clamp for both axes
    pub arena_min: f32,
    /// Upper clamp for both axes
    pub arena_max: f32,

    // === Collision radii ===
    pub capture_radius: f32,
    pub obstacle_radius: f32,
    pub enemy_hit_radius: f32,

    // === Collectible placement (inclusive integer ranges) ===
    pub collectible_x: (i32, i32),
    pub collectible_y: (i32, i32),

    // === Obstacles ===
    pub obstacles: bool,
    pub obstacle_count: (u32, u32),
    pub obstacle_area: (f32, f32),
    pub obstacle_safe_distance: f32,
    pub obstacle_separation: f32,
    pub obstacle_attempts: u32,

    // === Enemies ===
    pub enemies: bool,
    pub enemy_on_hit: EnemyOnHit,
    /// How far outside the visible arena enemies appear
    pub enemy_spawn_margin: f32,
    /// Speed per steering tick, ramped by score
    pub enemy_speed: Ramp,
    pub enemy_step_ms: u64,
    /// Spawn interval: `max(start - score * per_score, floor)`
    pub spawn_interval_start_ms: u64,
    pub spawn_interval_per_score_ms: u64,
    pub spawn_interval_floor_ms: u64,

    // === Quiz ===
    pub quiz_mode: QuizMode,
    /// Seconds: `max(floor, base - level)`
    pub quiz_time_base: u32,
    pub quiz_time_floor: u32,
    /// Operand range ramped by level
    pub operand_range: Ramp,
    /// Subtraction and multiplication unlock at this level
    pub mixed_ops_min_level: u32,
    pub multiply_operand_max: i32,
    /// Share of draws that stay addition once other operators unlock
    pub addition_share: f32,
    /// Addition plus subtraction share; the rest is multiplication
    pub subtraction_cutoff: f32,
    /// Negative operands become possible once score exceeds this
    pub negative_after_score: u32,
    pub negative_chance_per_score: f32,
    pub negative_chance_max: f32,
    /// Distractor offsets drawn from `[lo, hi]`, zero excluded
    pub distractor_offset: (i32, i32),

    // === Delays ===
    pub correct_delay_ms: u64,
    pub wrong_delay_ms: u64,
    pub enemy_game_over_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_step: 3.0,
            arena_min: 8.0,
            arena_max: 92.0,

            capture_radius: 10.0,
            obstacle_radius: 6.0,
            enemy_hit_radius: 6.0,

            collectible_x: (15, 84),
            collectible_y: (20, 79),

            obstacles: true,
            obstacle_count: (3, 4),
            obstacle_area: (10.0, 90.0),
            obstacle_safe_distance: 20.0,
            obstacle_separation: 25.0,
            obstacle_attempts: 50,

            enemies: true,
            enemy_on_hit: EnemyOnHit::Despawn,
            enemy_spawn_margin: 10.0,
            enemy_speed: Ramp {
                base: 0.5,
                per_step: 0.1,
                cap: 2.0,
            },
            enemy_step_ms: 50,
            spawn_interval_start_ms: 5000,
            spawn_interval_per_score_ms: 200,
            spawn_interval_floor_ms: 2000,

            quiz_mode: QuizMode::Arithmetic,
            quiz_time_base: 15,
            quiz_time_floor: 6,
            operand_range: Ramp {
                base: 20.0,
                per_step: 8.0,
                cap: 100.0,
            },
            mixed_ops_min_level: 3,
            multiply_operand_max: 12,
            addition_share: 0.5,
            subtraction_cutoff: 0.8,
            negative_after_score: 5,
            negative_chance_per_score: 0.1,
            negative_chance_max: 0.7,
            distractor_offset: (-10, 9),

            correct_delay_ms: 1000,
            wrong_delay_ms: 1500,
            enemy_game_over_delay_ms: 500,
        }
    }
}

impl Tuning {
    /// Knockback variant: tighter pickup, bigger enemy reach, faster enemies
    pub fn chase() -> Self {
        Self {
            capture_radius: 5.0,
            enemy_hit_radius: 8.0,
            enemy_on_hit: EnemyOnHit::Respawn,
            enemy_spawn_margin: 15.0,
            enemy_speed: Ramp {
                base: 1.2,
                per_step: 0.15,
                cap: 4.0,
            },
            quiz_time_base: 20,
            quiz_time_floor: 8,
            ..Self::default()
        }
    }

    /// No rocks and no enemies
    pub fn classic() -> Self {
        Self {
            obstacles: false,
            enemies: false,
            ..Self::default()
        }
    }

    pub fn ratio() -> Self {
        Self {
            quiz_mode: QuizMode::RatioBank,
            ..Self::default()
        }
    }

    /// Parse a tuning table; missing fields take default values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sanity-check values that would break the simulation
    pub fn validate(&self) -> Result<(), String> {
        if self.arena_min >= self.arena_max {
            return Err("arena_min must be below arena_max".to_string());
        }
        if self.move_step <= 0.0 {
            return Err("move_step must be positive".to_string());
        }
        if self.obstacle_count.0 > self.obstacle_count.1 {
            return Err("obstacle_count range is inverted".to_string());
        }
        if self.enemy_step_ms == 0 {
            return Err("enemy_step_ms must be at least 1".to_string());
        }
        if self.spawn_interval_floor_ms == 0 {
            return Err("spawn_interval_floor_ms must be at least 1".to_string());
        }
        let (lo, hi) = self.distractor_offset;
        // Need three distinct non-zero offsets for three distractors
        if (hi - lo + 1) - i32::from(lo <= 0 && hi >= 0) < 3 {
            return Err("distractor_offset range too narrow".to_string());
        }
        Ok(())
    }
}
