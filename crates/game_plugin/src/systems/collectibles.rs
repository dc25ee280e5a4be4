// crates/game_plugin/src/systems/collectibles.rs

use crate::config::{COLLECTIBLE_SCORE, FLOATING_TEXT_SECS};
use crate::state::GameState;

/// Pick up at most one overlapping collectible per frame.
pub fn update_collectibles(gs: &mut GameState) {
    let player = gs.player.rect();
    let Some(index) = gs.collectibles.iter().position(|c| c.rect().intersects(&player)) else {
        return;
    };

    let collectible = gs.collectibles.remove(index);
    gs.score = gs.score.saturating_add(COLLECTIBLE_SCORE);
    gs.show_floating_text(format!("+{COLLECTIBLE_SCORE}"), collectible.pos, FLOATING_TEXT_SECS);
}
