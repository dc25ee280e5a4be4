// crates/game_plugin/src/systems/animation.rs

use crate::state::GameState;

/// Advance every sprite sheet by the scaled frame time.
pub fn update_sprites(gs: &mut GameState) {
    let delta_ms = gs.delta * 1000.0;
    for (_, sprite) in gs.sprites.iter_mut() {
        sprite.advance(delta_ms);
    }
}
