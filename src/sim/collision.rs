//! Movement and collision detection
//!
//! Everything is a circle test on percentage coordinates. The arena is not
//! square in pixels, so radii are slightly anisotropic on screen; the game
//! has always accepted that.

use glam::Vec2;

use super::state::{Collectible, Direction, Enemy, Obstacle};
use crate::tuning::Tuning;

/// Result of trying to move the player one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Target lies inside an obstacle; player stays put
    Blocked { obstacle_id: u32 },
    /// Target touches the collectible; player stays put and a quiz starts
    Collected,
    /// Step committed
    Moved(Vec2),
}

/// True when `a` is strictly closer than `radius` to `b`
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Target of one step in `dir`, clamped into the arena bounds
pub fn step_target(from: Vec2, dir: Direction, tuning: &Tuning) -> Vec2 {
    let step = tuning.move_step;
    let delta = match dir {
        Direction::Up => Vec2::new(0.0, -step),
        Direction::Down => Vec2::new(0.0, step),
        Direction::Left => Vec2::new(-step, 0.0),
        Direction::Right => Vec2::new(step, 0.0),
    };
    clamp_to_arena(from + delta, tuning)
}

/// Clamp both axes into `[arena_min, arena_max]`
#[inline]
pub fn clamp_to_arena(pos: Vec2, tuning: &Tuning) -> Vec2 {
    pos.clamp(
        Vec2::splat(tuning.arena_min),
        Vec2::splat(tuning.arena_max),
    )
}

/// First obstacle the point would sit inside, if any
pub fn obstacle_at(pos: Vec2, obstacles: &[Obstacle], radius: f32) -> Option<&Obstacle> {
    obstacles
        .iter()
        .find(|o| circles_overlap(pos, o.pos, radius))
}

pub fn touches_collectible(pos: Vec2, collectible: &Collectible, radius: f32) -> bool {
    circles_overlap(pos, collectible.pos, radius)
}

pub fn enemy_touches_player(enemy: &Enemy, player: Vec2, radius: f32) -> bool {
    circles_overlap(enemy.pos, player, radius)
}

/// Resolve one movement command.
///
/// Obstacles are checked before the collectible, so fruit tucked behind a
/// rock cannot be grabbed through it.
pub fn resolve_move(
    from: Vec2,
    dir: Direction,
    tuning: &Tuning,
    obstacles: &[Obstacle],
    collectible: &Collectible,
) -> MoveOutcome {
    let target = step_target(from, dir, tuning);

    if let Some(obstacle) = obstacle_at(target, obstacles, tuning.obstacle_radius) {
        return MoveOutcome::Blocked {
            obstacle_id: obstacle.id,
        };
    }

    if touches_collectible(target, collectible, tuning.capture_radius) {
        return MoveOutcome::Collected;
    }

    MoveOutcome::Moved(target)
}
