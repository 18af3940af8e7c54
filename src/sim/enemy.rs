//! Enemy spawning and steering

use glam::Vec2;

use super::collision::enemy_touches_player;
use super::difficulty::Difficulty;
use super::placement::{enemy_spawn_point, far_edge_point};
use super::state::{Enemy, GameEvent, GameState};
use crate::tuning::EnemyOnHit;

/// Move `enemy` by its speed straight toward `target`.
///
/// An enemy sitting exactly on the target has no direction and stays put.
pub fn steer(enemy: &mut Enemy, target: Vec2) {
    let to_target = target - enemy.pos;
    let dist = to_target.length();
    if dist == 0.0 {
        return;
    }
    enemy.pos += to_target / dist * enemy.speed;
}

/// Spawn one enemy at a random edge with the current difficulty speed
pub fn spawn_enemy(state: &mut GameState) -> u32 {
    let speed = Difficulty::for_score(state.scores.score, &state.tuning).enemy_speed;
    let pos = enemy_spawn_point(&mut state.rng, &state.tuning);
    let id = state.next_entity_id();
    state.enemies.push(Enemy { id, pos, speed });
    log::debug!("Enemy {} spawned at ({:.1}, {:.1}) speed {:.2}", id, pos.x, pos.y, speed);
    state.emit(GameEvent::EnemySpawned { id });
    id
}

/// Advance every enemy one steering step and resolve contacts.
///
/// Each contact costs one heart. A touching enemy is removed or knocked back
/// to a far edge depending on `enemy_on_hit`; it is never left on the player.
/// Contacts stop counting once hearts reach zero. Returns the number of
/// hearts lost.
pub fn step_enemies(state: &mut GameState) -> u32 {
    let player = state.player.pos;
    let radius = state.tuning.enemy_hit_radius;
    let policy = state.tuning.enemy_on_hit;

    let mut hits = 0;
    let mut i = 0;
    while i < state.enemies.len() {
        steer(&mut state.enemies[i], player);

        if state.scores.hearts == 0 || !enemy_touches_player(&state.enemies[i], player, radius) {
            i += 1;
            continue;
        }

        hits += 1;
        let hearts = state.scores.lose_heart();
        log::info!("Enemy {} hit the player, {} hearts left", state.enemies[i].id, hearts);
        state.emit(GameEvent::PlayerHit { hearts });

        match policy {
            EnemyOnHit::Despawn => {
                state.enemies.remove(i);
            }
            EnemyOnHit::Respawn => {
                let pos = far_edge_point(&mut state.rng, &state.tuning, player);
                state.enemies[i].pos = pos;
                i += 1;
            }
        }
    }
    hits
}
