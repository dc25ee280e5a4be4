// crates/game_plugin/src/systems/player.rs

use engine_shared::{Action, Vec2};

use crate::config::{GRID_SIZE, LADDER_SPEED_DIVISOR, PLAYER_JUMP, PLAYER_SPEED};
use crate::physics;
use crate::state::GameState;
use crate::systems::progression;

/// Held-key direction: x from left/right, y from up/down (down positive).
fn input_direction(gs: &GameState) -> Vec2 {
    let input = &gs.input;
    Vec2::new(
        input.axis(Action::MoveLeft, Action::MoveRight),
        input.axis(Action::MoveUp, Action::MoveDown),
    )
}

pub fn update_player(gs: &mut GameState) {
    // Keys type the player's name on the game-over screen.
    if !gs.is_name_entry() {
        let dir = input_direction(gs);
        gs.player.vel.x = dir.x * PLAYER_SPEED * GRID_SIZE;

        if gs.input.is_active(Action::Jump) && physics::can_jump(&gs.player, &gs.platforms) {
            gs.player.vel.y = -PLAYER_JUMP * GRID_SIZE;
        }

        if physics::on_ladder(&gs.player, &gs.ladders) {
            gs.player.vel.y = dir.y * PLAYER_SPEED * GRID_SIZE / LADDER_SPEED_DIVISOR;
        }
    }

    physics::update_physics(&mut gs.player, &gs.platforms, gs.delta, gs.debug);

    if gs.is_real_level() && gs.player.rect().intersects(&gs.woman.rect()) {
        progression::complete_level(gs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, LEVEL_GAME_OVER, LEVEL_SCORE};
    use crate::state::Entity;
    use crate::systems::test_support::{arena, DT};
    use engine_shared::InputState;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn horizontal_input_sets_velocity() {
        let mut gs = arena(&[]);
        gs.input = InputState::default().with(Action::MoveLeft);
        let x = gs.player.pos.x;
        update_player(&mut gs);
        assert!(gs.player.pos.x < x);
        assert_eq!(gs.player.vel.x, -PLAYER_SPEED * GRID_SIZE * crate::config::HORIZONTAL_DAMPING);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let mut gs = arena(&[]);
        gs.input = InputState::default().with(Action::Jump);
        update_player(&mut gs);
        assert!(gs.player.vel.y < 0.0);

        // Mid-air a held jump does nothing more than gravity.
        let vy = gs.player.vel.y;
        update_player(&mut gs);
        assert!(gs.player.vel.y > vy);
    }

    #[test]
    fn ladder_overrides_vertical_velocity() {
        let mut gs = arena(&[]);
        gs.player.pos = Vec2::new(300.0, 300.0);
        gs.ladders.push(Entity::new(Vec2::new(290.0, 200.0), Vec2::new(60.0, 400.0)));
        gs.input = InputState::default().with(Action::MoveUp);
        let y = gs.player.pos.y;
        update_player(&mut gs);
        let climb = PLAYER_SPEED * GRID_SIZE / LADDER_SPEED_DIVISOR;
        assert!((gs.player.pos.y - (y - climb * DT)).abs() < 1e-9);

        // Holding nothing on a ladder hangs in place.
        gs.input = InputState::default();
        let y = gs.player.pos.y;
        update_player(&mut gs);
        assert_eq!(gs.player.pos.y, y);
    }

    #[test]
    fn name_entry_ignores_movement() {
        let mut gs = arena(&[]);
        gs.level = LEVEL_GAME_OVER;
        gs.input = InputState::default().with(Action::MoveRight).with(Action::Jump);
        let x = gs.player.pos.x;
        update_player(&mut gs);
        assert_eq!(gs.player.pos.x, x);
        assert!(gs.player.vel.y >= 0.0);
    }

    #[test]
    fn reaching_the_woman_advances_with_bonus() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("level2.kd"), "Player\npos(1 21)\nWoman\npos(20 2)\n").unwrap();
        let mut gs = arena(&[]);
        gs.config = GameConfig::with_assets_dir(dir.path());
        gs.score = 50;
        gs.woman.pos = gs.player.pos;

        update_player(&mut gs);

        assert_eq!(gs.level, 2);
        assert_eq!(gs.score, 50 + LEVEL_SCORE);
        assert_eq!(gs.player.pos, Vec2::new(30.0, 630.0));
    }

    #[test]
    fn missing_next_level_withholds_bonus() {
        let mut gs = arena(&[]);
        gs.woman.pos = gs.player.pos;
        update_player(&mut gs);
        assert_eq!(gs.level, 1);
        assert_eq!(gs.score, 0);
    }
}
