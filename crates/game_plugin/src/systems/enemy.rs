// crates/game_plugin/src/systems/enemy.rs

use engine_shared::Vec2;

use crate::config::{ENEMY_JUMP, ENEMY_JUMP_COOLDOWN, ENEMY_THROW_COOLDOWN, GRID_SIZE};
use crate::physics;
use crate::state::{Barrel, GameState};

/// Gravity plus two independent timers: a periodic hop everywhere, and a
/// periodic barrel throw on real levels.
pub fn update_enemy(gs: &mut GameState) {
    physics::update_physics(&mut gs.enemy, &gs.platforms, gs.delta, gs.debug);

    if gs.enemy_jump_cooldown > 0.0 {
        gs.enemy_jump_cooldown -= gs.delta;
    } else {
        gs.enemy_jump_cooldown = ENEMY_JUMP_COOLDOWN;
        gs.enemy.vel.y = -ENEMY_JUMP * GRID_SIZE;
    }

    if !gs.is_real_level() {
        return;
    }

    if gs.enemy_throw_cooldown > 0.0 {
        gs.enemy_throw_cooldown -= gs.delta;
    } else {
        gs.enemy_throw_cooldown = ENEMY_THROW_COOLDOWN;
        gs.barrels.push(Barrel::spawn_at(gs.enemy.pos + Vec2::splat(GRID_SIZE)));
    }
}
