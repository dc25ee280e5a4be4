// crates/game_plugin/src/lifecycle.rs
//! Cold start, per-frame update and the two halves of a module swap.
//!
//! Presentation resources (sprite textures, the font, text textures) belong to
//! the host canvas and never survive a swap: `pre_reload` releases all of
//! them, `post_reload` and `init` acquire them again from the sprite table.

use engine_shared::{Canvas, FrameStatus, InputState, ModuleError, ResourceError};
use tracing::info;

use crate::config::{GameConfig, LEVEL_MENU};
use crate::level;
use crate::shims;
use crate::state::GameState;
use crate::systems;

/// Open the font and load every sprite sheet. On failure anything already
/// acquired is released again.
pub fn acquire_resources(gs: &mut GameState, canvas: &mut dyn Canvas) -> Result<(), ResourceError> {
    if let Err(err) = try_acquire(gs, canvas) {
        release_resources(gs, canvas);
        return Err(err);
    }
    gs.reset_animations();
    Ok(())
}

fn try_acquire(gs: &mut GameState, canvas: &mut dyn Canvas) -> Result<(), ResourceError> {
    gs.font = Some(canvas.open_font(&gs.config.font, gs.config.font_size)?);
    for (sheet, sprite) in gs.sprites.iter_mut() {
        sprite.texture = Some(canvas.load_texture(sheet.name)?);
        sprite.frames = sheet.frames;
        sprite.duration = sheet.duration_ms;
    }
    Ok(())
}

pub fn release_resources(gs: &mut GameState, canvas: &mut dyn Canvas) {
    if let Some(font) = gs.font.take() {
        canvas.close_font(font);
    }
    for (_, sprite) in gs.sprites.iter_mut() {
        if let Some(texture) = sprite.texture.take() {
            canvas.destroy_texture(texture);
        }
    }
    // Floating texts re-rasterize lazily on their next draw.
    for text in &mut gs.floating_texts {
        if let Some(texture) = text.texture.take() {
            canvas.destroy_texture(texture);
        }
    }
    for texture in gs.discarded_textures.drain(..) {
        canvas.destroy_texture(texture);
    }
}

/// Fresh state on the menu level with resources loaded.
pub fn init(config: GameConfig, canvas: &mut dyn Canvas) -> Result<GameState, ModuleError> {
    let mut gs = GameState::new(config);
    level::load_level(&mut gs, LEVEL_MENU);
    acquire_resources(&mut gs, canvas)?;
    info!(assets = %gs.config.assets_dir.display(), "game initialized");
    Ok(gs)
}

/// Measure time, then run one simulation step on the given input snapshot.
pub fn update(gs: &mut GameState, input: &InputState) -> FrameStatus {
    gs.input = *input;

    let times = gs.clock.tick(gs.time_scale, gs.paused, gs.frame_limit);
    gs.delta = times.delta;
    gs.delta_unscaled = times.delta_unscaled;

    systems::run_frame(gs);

    FrameStatus {
        window_title: gs.clock.fps_report(times.delta_unscaled),
    }
}

pub fn pre_reload(gs: &mut GameState, canvas: &mut dyn Canvas) -> Result<Vec<u8>, ModuleError> {
    info!("pre reload");
    release_resources(gs, canvas);
    Ok(shims::save_state(gs)?)
}

/// Rebuild the live state from a snapshot. The wall clock restarts, so the
/// first frame after a swap measures zero elapsed time.
pub fn post_reload(snapshot: &[u8], canvas: &mut dyn Canvas) -> Result<GameState, ModuleError> {
    let mut gs = shims::load_state(snapshot)?;
    acquire_resources(&mut gs, canvas)?;
    info!(level = gs.level, "post reload");
    Ok(gs)
}
