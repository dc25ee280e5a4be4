// crates/game_plugin/src/systems/progression.rs
//! Level state machine: menu -> levels 1..=3 -> game over / name entry -> menu.

use tracing::info;

use crate::config::{LEVEL_GAME_OVER, LEVEL_MENU, LEVEL_SCORE, STARTING_LIVES};
use crate::level;
use crate::state::GameState;

/// Fresh run from level 1. Counters are only reset if the level loads.
pub fn new_game(gs: &mut GameState) -> bool {
    if !level::load_level(gs, 1) {
        return false;
    }
    gs.lives = STARTING_LIVES;
    gs.score = 0;
    gs.play_time = 0.0;
    info!("new game");
    true
}

pub fn return_to_menu(gs: &mut GameState) {
    level::load_level(gs, LEVEL_MENU);
}

/// On the menu, climbing above the first ladder starts a game. A failed start
/// is retried only once the player has come back down and crosses again.
pub fn update_menu(gs: &mut GameState) {
    if gs.level != LEVEL_MENU {
        return;
    }
    let Some(start_line) = gs.ladders.first().map(|ladder| ladder.pos.y) else {
        return;
    };
    if gs.player.pos.y >= start_line {
        gs.menu_start_failed = false;
    } else if !gs.menu_start_failed {
        gs.menu_start_failed = !new_game(gs);
    }
}

/// Award the rescue bonus and move to the next level. Finishing the last
/// playable level lands on the name-entry screen.
pub fn complete_level(gs: &mut GameState) {
    let next = gs.level + 1;
    // The bonus goes in first so the game-over screen records it.
    gs.score = gs.score.saturating_add(LEVEL_SCORE);
    if !level::load_level(gs, next) {
        gs.score = gs.score.saturating_sub(LEVEL_SCORE);
    }
}

pub fn check_game_over(gs: &mut GameState) {
    if gs.is_real_level() && gs.lives == 0 {
        info!(score = gs.score, "game over");
        level::load_level(gs, LEVEL_GAME_OVER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::Entity;
    use crate::systems::test_support::arena;
    use engine_shared::Vec2;
    use std::fs;
    use tempfile::TempDir;

    fn with_levels(dir: &TempDir) -> GameState {
        fs::write(dir.path().join("level1.kd"), "Player\npos(2 21)\n").unwrap();
        fs::write(dir.path().join("level4.kd"), "Dragon\n").unwrap();
        let mut gs = arena(&[]);
        gs.config = GameConfig::with_assets_dir(dir.path());
        gs
    }

    #[test]
    fn climbing_past_menu_ladder_starts_game() {
        let dir = TempDir::new().unwrap();
        let mut gs = with_levels(&dir);
        gs.level = LEVEL_MENU;
        gs.lives = 0;
        gs.score = 900;
        gs.play_time = 12.0;
        gs.ladders = vec![Entity::new(Vec2::new(150.0, 390.0), Vec2::new(60.0, 300.0))];

        gs.player.pos.y = 400.0;
        update_menu(&mut gs);
        assert_eq!(gs.level, LEVEL_MENU);

        gs.player.pos.y = 389.0;
        update_menu(&mut gs);
        assert_eq!(gs.level, 1);
        assert_eq!((gs.lives, gs.score, gs.play_time), (STARTING_LIVES, 0, 0.0));
    }

    #[test]
    fn failed_start_waits_for_player_to_cross_again() {
        let dir = TempDir::new().unwrap();
        let mut gs = arena(&[]);
        gs.config = GameConfig::with_assets_dir(dir.path());
        gs.level = LEVEL_MENU;
        gs.ladders = vec![Entity::new(Vec2::new(150.0, 390.0), Vec2::new(60.0, 300.0))];

        gs.player.pos.y = 389.0;
        update_menu(&mut gs);
        assert_eq!(gs.level, LEVEL_MENU);
        assert!(gs.menu_start_failed);

        // Level 1 appears, but the player has not left the start zone yet.
        fs::write(dir.path().join("level1.kd"), "Player\npos(2 21)\n").unwrap();
        update_menu(&mut gs);
        assert_eq!(gs.level, LEVEL_MENU);

        gs.player.pos.y = 400.0;
        update_menu(&mut gs);
        assert!(!gs.menu_start_failed);

        gs.player.pos.y = 389.0;
        update_menu(&mut gs);
        assert_eq!(gs.level, 1);
    }

    #[test]
    fn game_over_only_on_real_levels() {
        let mut gs = arena(&[]);
        gs.lives = 0;
        gs.level = LEVEL_MENU;
        check_game_over(&mut gs);
        assert_eq!(gs.level, LEVEL_MENU);

        gs.level = 3;
        check_game_over(&mut gs);
        assert_eq!(gs.level, LEVEL_GAME_OVER);
    }

    #[test]
    fn game_over_screen_never_reads_disk() {
        let dir = TempDir::new().unwrap();
        let mut gs = with_levels(&dir);
        gs.lives = 0;
        check_game_over(&mut gs);
        assert_eq!(gs.level, LEVEL_GAME_OVER);
    }

    #[test]
    fn final_level_leads_to_name_entry() {
        let mut gs = arena(&[]);
        gs.level = 3;
        gs.score = 10;
        complete_level(&mut gs);
        assert_eq!(gs.level, LEVEL_GAME_OVER);
        assert_eq!(gs.leaderboard.last().map(|e| e.score), Some(10 + LEVEL_SCORE));
    }
}
