//! Score-driven difficulty
//!
//! Pure function of the current score: every knob the game turns as the
//! player improves is derived here.

use crate::consts::SCORE_PER_LEVEL;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// `floor(score / 3)`
    pub level: u32,
    /// Quiz countdown start, in seconds
    pub time_limit: u32,
    /// Operands are drawn from `[0, range)`
    pub operand_range: i32,
    /// Speed given to enemies spawned now
    pub enemy_speed: f32,
    /// Delay until the next enemy spawn
    pub spawn_interval_ms: u64,
}

impl Difficulty {
    pub fn for_score(score: u32, tuning: &Tuning) -> Self {
        let level = score / SCORE_PER_LEVEL;
        let time_limit = tuning
            .quiz_time_base
            .saturating_sub(level)
            .max(tuning.quiz_time_floor);
        let operand_range = tuning.operand_range.at(level).round().max(1.0) as i32;
        let enemy_speed = tuning.enemy_speed.at(score);
        let spawn_interval_ms = tuning
            .spawn_interval_start_ms
            .saturating_sub(u64::from(score) * tuning.spawn_interval_per_score_ms)
            .max(tuning.spawn_interval_floor_ms);

        Self {
            level,
            time_limit,
            operand_range,
            enemy_speed,
            spawn_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_zero() {
        let d = Difficulty::for_score(0, &Tuning::default());
        assert_eq!(d.level, 0);
        assert_eq!(d.time_limit, 15);
        assert_eq!(d.operand_range, 20);
        assert_eq!(d.spawn_interval_ms, 5000);
        assert!((d.enemy_speed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scaling_and_floors() {
        let tuning = Tuning::default();
        let d = Difficulty::for_score(9, &tuning);
        assert_eq!(d.level, 3);
        assert_eq!(d.time_limit, 12);
        assert_eq!(d.operand_range, 44);
        assert_eq!(d.spawn_interval_ms, 3200);

        let d = Difficulty::for_score(60, &tuning);
        assert_eq!(d.time_limit, 6);
        assert_eq!(d.operand_range, 100);
        assert_eq!(d.spawn_interval_ms, 2000);
        assert!((d.enemy_speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_chase_time_limits() {
        let tuning = Tuning::chase();
        assert_eq!(Difficulty::for_score(0, &tuning).time_limit, 20);
        assert_eq!(Difficulty::for_score(300, &tuning).time_limit, 8);
    }

    #[test]
    fn test_enemy_speed_non_decreasing() {
        let tuning = Tuning::chase();
        let mut last = 0.0;
        for score in 0..100 {
            let speed = Difficulty::for_score(score, &tuning).enemy_speed;
            assert!(speed >= last);
            last = speed;
        }
    }
}
