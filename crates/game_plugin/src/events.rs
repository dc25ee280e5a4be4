// crates/game_plugin/src/events.rs
//! Discrete key presses: name entry on the game-over screen, hotkeys elsewhere.

use engine_shared::{GameEvent, Key};
use tracing::{error, info};

use crate::config::{NAME_LENGTH, STARTING_LIVES, TIME_SCALE_MAX};
use crate::level;
use crate::state::GameState;
use crate::systems::progression;

pub fn handle_event(gs: &mut GameState, event: &GameEvent) {
    let GameEvent::KeyPressed(key) = *event;
    if gs.is_name_entry() {
        handle_name_entry(gs, key);
    } else {
        handle_hotkey(gs, key);
    }
}

fn handle_name_entry(gs: &mut GameState, key: Key) {
    if key == Key::Enter {
        submit_name(gs);
        return;
    }
    let Some(entry) = gs.leaderboard.last_mut() else {
        return;
    };
    match key {
        Key::Backspace => {
            entry.name.pop();
        }
        Key::Char(c) if c.is_ascii_alphanumeric() && entry.name.chars().count() < NAME_LENGTH => {
            entry.name.push(c);
        }
        _ => {}
    }
}

/// Persist the pending entry and go back to the menu, which re-reads the file.
fn submit_name(gs: &mut GameState) {
    let path = gs.config.leaderboard_path();
    if let Some(entry) = gs.leaderboard.last() {
        match level::append_leaderboard(&path, entry) {
            Ok(()) => info!(name = %entry.name, score = entry.score, "leaderboard entry saved"),
            Err(err) => error!(%err, "failed to save leaderboard entry"),
        }
    }
    progression::return_to_menu(gs);
}

pub fn faster(time_scale: f64) -> f64 {
    let step = if time_scale < 1.0 { 0.1 } else { 0.5 };
    (time_scale + step).min(TIME_SCALE_MAX)
}

pub fn slower(time_scale: f64) -> f64 {
    let step = if time_scale <= 1.0 { 0.1 } else { 0.5 };
    (time_scale - step).max(0.0)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn handle_hotkey(gs: &mut GameState, key: Key) {
    match key {
        Key::F1 => {
            gs.debug = !gs.debug;
            info!("debug mode {}", on_off(gs.debug));
        }
        Key::F2 => {
            gs.frame_limit = !gs.frame_limit;
            info!("frame limit {}", on_off(gs.frame_limit));
        }
        Key::Left => gs.leaderboard_page = gs.leaderboard_page.saturating_sub(1),
        Key::Right => {
            gs.leaderboard_page = (gs.leaderboard_page + 1).min(level::last_page(gs.leaderboard.len()));
        }
        Key::Char(c) => match c {
            '+' | '=' => {
                gs.time_scale = faster(gs.time_scale);
                info!(time_scale = gs.time_scale, "time scale");
            }
            '-' => {
                gs.time_scale = slower(gs.time_scale);
                info!(time_scale = gs.time_scale, "time scale");
            }
            '0' => {
                gs.time_scale = 1.0;
                info!(time_scale = gs.time_scale, "time scale (default)");
            }
            '[' => gs.score = gs.score.saturating_sub(100),
            ']' => gs.score = gs.score.saturating_add(100),
            '\\' => gs.lives = STARTING_LIVES,
            '1'..='4' => {
                let target = c as u8 - b'0';
                level::load_level(gs, target);
            }
            'n' => {
                progression::new_game(gs);
            }
            'm' => progression::return_to_menu(gs),
            'r' => {
                let current = gs.level;
                level::load_level(gs, current);
            }
            'p' => {
                gs.paused = !gs.paused;
                info!("paused {}", on_off(gs.paused));
            }
            'f' => {
                let pos = gs.player.pos;
                gs.show_floating_text("Floating text", pos, 2.0);
            }
            _ => {}
        },
        _ => {}
    }
}
