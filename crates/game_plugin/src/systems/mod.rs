// crates/game_plugin/src/systems/mod.rs
//! Per-frame simulation stages. `run_frame` calls them in a fixed order;
//! each stage sees the effects of every stage before it in the same frame.

pub mod animation;
pub mod barrels;
pub mod collectibles;
pub mod enemy;
pub mod player;
pub mod progression;

use crate::physics;
use crate::state::GameState;

/// One simulation step, excluding timing and rendering.
pub fn run_frame(gs: &mut GameState) {
    animation::update_sprites(gs);
    progression::update_menu(gs);

    if !gs.is_real_level() {
        physics::update_physics(&mut gs.woman, &gs.platforms, gs.delta, gs.debug);
    }

    collectibles::update_collectibles(gs);
    barrels::update_barrels(gs);
    enemy::update_enemy(gs);
    player::update_player(gs);

    if gs.is_real_level() {
        gs.play_time += gs.delta;
    }

    progression::check_game_over(gs);
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::LEVEL_GAME_OVER;
    use crate::state::Barrel;
    use engine_shared::Vec2;

    #[test]
    fn play_time_only_counts_on_real_levels() {
        let mut gs = arena(&[]);
        run_frame(&mut gs);
        assert!((gs.play_time - DT).abs() < 1e-12);

        gs.level = LEVEL_GAME_OVER;
        gs.leaderboard.push(Default::default());
        let before = gs.play_time;
        run_frame(&mut gs);
        assert_eq!(gs.play_time, before);
    }

    #[test]
    fn game_over_sees_same_frame_life_loss() {
        let mut gs = arena(&[]);
        gs.lives = 1;
        gs.score = 777;
        let mut barrel = Barrel::spawn_at(gs.player.pos);
        barrel.body.vel.x = 1.0;
        gs.barrels.push(barrel);

        run_frame(&mut gs);

        assert_eq!(gs.lives, 0);
        assert_eq!(gs.level, LEVEL_GAME_OVER);
        assert_eq!(gs.leaderboard.last().map(|e| e.score), Some(777));
    }

    #[test]
    fn woman_idles_under_physics_off_real_levels() {
        let mut gs = arena(&[]);
        gs.level = 0;
        gs.ladders.push(crate::state::Entity::new(Vec2::new(0.0, 0.0), Vec2::new(60.0, 60.0)));
        let start = gs.woman.pos.y;
        run_frame(&mut gs);
        assert!(gs.woman.vel.y > 0.0 || gs.woman.pos.y > start);

        let mut gs = arena(&[]);
        let start = gs.woman.pos;
        run_frame(&mut gs);
        assert_eq!(gs.woman.pos, start);
    }
}
