//! Entity placement
//!
//! Collectible and obstacle layout for each round, plus edge spawn points for
//! enemies. Obstacle placement is best-effort: a slot that cannot satisfy the
//! separation rules within its attempt budget is dropped.

use glam::Vec2;

use super::state::Collectible;
use crate::consts::ARENA_SIZE;
use crate::rng::GameRng;
use crate::tuning::Tuning;

/// Arena edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}

/// Fresh collectible away from the arena edge
pub fn place_collectible(rng: &mut GameRng, tuning: &Tuning) -> Collectible {
    let (x_lo, x_hi) = tuning.collectible_x;
    let (y_lo, y_hi) = tuning.collectible_y;
    Collectible {
        pos: Vec2::new(
            rng.int_range(x_lo, x_hi) as f32,
            rng.int_range(y_lo, y_hi) as f32,
        ),
    }
}

/// Obstacle positions for a new round.
///
/// Each returned point is at least `obstacle_safe_distance` from `safe_point`,
/// at least `obstacle_separation` from every other point in the batch, and
/// far enough from `collectible` that the fruit can always be grabbed from a
/// free cell. The result may be shorter than the drawn target count.
pub fn place_obstacles(
    rng: &mut GameRng,
    tuning: &Tuning,
    safe_point: Vec2,
    collectible: Vec2,
) -> Vec<Vec2> {
    let (min_count, max_count) = tuning.obstacle_count;
    let target = rng.int_range(min_count as i32, max_count as i32).max(0) as usize;
    let (lo, hi) = tuning.obstacle_area;
    let fruit_clearance = tuning.obstacle_radius + tuning.capture_radius;

    let mut placed: Vec<Vec2> = Vec::with_capacity(target);
    for slot in 0..target {
        let candidate = (0..tuning.obstacle_attempts)
            .map(|_| Vec2::new(rng.float_range(lo, hi), rng.float_range(lo, hi)))
            .find(|p| {
                p.distance(safe_point) >= tuning.obstacle_safe_distance
                    && p.distance(collectible) >= fruit_clearance
                    && placed
                        .iter()
                        .all(|o| p.distance(*o) >= tuning.obstacle_separation)
            });

        match candidate {
            Some(p) => placed.push(p),
            None => log::warn!(
                "Obstacle slot {} dropped after {} attempts",
                slot,
                tuning.obstacle_attempts
            ),
        }
    }

    log::debug!("Placed {}/{} obstacles", placed.len(), target);
    placed
}

/// Random point just outside the given edge
pub fn edge_point(rng: &mut GameRng, edge: Edge, margin: f32) -> Vec2 {
    let along = rng.float_range(0.0, ARENA_SIZE);
    match edge {
        Edge::Top => Vec2::new(along, -margin),
        Edge::Right => Vec2::new(ARENA_SIZE + margin, along),
        Edge::Bottom => Vec2::new(along, ARENA_SIZE + margin),
        Edge::Left => Vec2::new(-margin, along),
    }
}

/// Spawn point on a uniformly chosen edge
pub fn enemy_spawn_point(rng: &mut GameRng, tuning: &Tuning) -> Vec2 {
    let edge = Edge::ALL[rng.below(Edge::ALL.len() as u32) as usize];
    edge_point(rng, edge, tuning.enemy_spawn_margin)
}

/// Off-screen point on whichever edge lands farthest from `player`
pub fn far_edge_point(rng: &mut GameRng, tuning: &Tuning, player: Vec2) -> Vec2 {
    let candidates: Vec<Vec2> = Edge::ALL
        .iter()
        .map(|edge| edge_point(rng, *edge, tuning.enemy_spawn_margin))
        .collect();
    candidates
        .into_iter()
        .max_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))
        .unwrap_or(Vec2::new(-tuning.enemy_spawn_margin, -tuning.enemy_spawn_margin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn outside_arena(p: Vec2) -> bool {
        p.x < 0.0 || p.x > ARENA_SIZE || p.y < 0.0 || p.y > ARENA_SIZE
    }

    #[test]
    fn test_collectible_in_range() {
        let tuning = Tuning::default();
        let mut rng = GameRng::new(1);
        for _ in 0..1000 {
            let c = place_collectible(&mut rng, &tuning);
            assert!((15.0..=85.0).contains(&c.pos.x));
            assert!((20.0..=80.0).contains(&c.pos.y));
        }
    }

    #[test]
    fn test_obstacle_count_bounded() {
        let tuning = Tuning::default();
        let mut rng = GameRng::new(2);
        for _ in 0..200 {
            let n = place_obstacles(&mut rng, &tuning, Vec2::new(50.0, 50.0), Vec2::ZERO).len();
            assert!(n <= 4);
        }
    }

    #[test]
    fn test_impossible_constraints_yield_fewer() {
        let tuning = Tuning {
            obstacle_area: (40.0, 55.0),
            obstacle_separation: 25.0,
            obstacle_safe_distance: 0.0,
            ..Tuning::default()
        };
        let mut rng = GameRng::new(3);
        // A 15x15 box has a diagonal under the 25-unit separation
        let placed = place_obstacles(&mut rng, &tuning, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(placed.len(), 1);
    }

    #[test]
    fn test_spawn_points_off_screen() {
        let tuning = Tuning::default();
        let mut rng = GameRng::new(4);
        for _ in 0..500 {
            assert!(outside_arena(enemy_spawn_point(&mut rng, &tuning)));
        }
    }

    #[test]
    fn test_far_edge_point_is_far() {
        let tuning = Tuning::default();
        let mut rng = GameRng::new(5);
        let player = Vec2::new(10.0, 10.0);
        for _ in 0..200 {
            let p = far_edge_point(&mut rng, &tuning, player);
            assert!(outside_arena(p));
            assert!(p.distance(player) > 50.0);
        }
    }

    proptest! {
        #[test]
        fn obstacles_respect_separation(
            seed in any::<u64>(),
            sx in 8.0f32..92.0,
            sy in 8.0f32..92.0,
        ) {
            let tuning = Tuning::default();
            let mut rng = GameRng::new(seed);
            let safe = Vec2::new(sx, sy);
            let fruit = place_collectible(&mut rng, &tuning).pos;
            let placed = place_obstacles(&mut rng, &tuning, safe, fruit);
            prop_assert!(placed.len() <= 4);
            for (i, a) in placed.iter().enumerate() {
                prop_assert!(a.distance(safe) >= 20.0);
                prop_assert!(a.distance(fruit) >= 16.0);
                for b in &placed[i + 1..] {
                    prop_assert!(a.distance(*b) >= 25.0);
                }
            }
        }
    }
}
