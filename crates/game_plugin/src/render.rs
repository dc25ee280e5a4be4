// crates/game_plugin/src/render.rs
//! Draws a `GameState` back to front through the host's `Canvas`.
//!
//! Rendering only mutates the state to age and expire floating texts and to
//! cache their textures; everything else is read-only.

use engine_shared::{Canvas, Color, Flip, Rect, Vec2, Vec2Ext, MOUSE_LEFT};
use tracing::{debug, warn};

use crate::config::{level_color, GRID_COLUMNS, GRID_ROWS, GRID_SIZE, PAGE_SIZE, SCREEN_WIDTH, SPRITE_SIZE};
use crate::physics;
use crate::state::{Entity, GameState, Sprite, SpriteId};

const HUD_BORDER: f64 = 2.0;
const LEADERBOARD_SCALE: f64 = 1.75;
const NAME_PROMPT_SCALE: f64 = 2.0;

pub fn render(gs: &mut GameState, canvas: &mut dyn Canvas) {
    for texture in gs.discarded_textures.drain(..) {
        canvas.destroy_texture(texture);
    }

    if gs.debug {
        render_debug_grid(gs, canvas);
    }

    render_platforms(gs, canvas);
    render_ladders(gs, canvas);
    render_collectibles(gs, canvas);
    render_barrels(gs, canvas);
    render_ui(gs, canvas);
    render_woman(gs, canvas);
    render_enemy(gs, canvas);
    render_player(gs, canvas);
    render_floating_texts(gs, canvas);
}

/// Blit `frame` of a horizontal sprite strip into `dst`. The source cell is
/// `dst` scaled back to sheet pixels.
fn draw_frame(canvas: &mut dyn Canvas, sprite: &Sprite, frame: u8, dst: Rect, flip: Flip) {
    let Some(texture) = sprite.texture else {
        return;
    };
    let scale = GRID_SIZE / SPRITE_SIZE;
    let (w, h) = (dst.size.x / scale, dst.size.y / scale);
    let src = Rect::new(frame as f64 * w, 0.0, w, h);
    canvas.blit(texture, Some(src), dst, flip);
}

fn draw_sprite(canvas: &mut dyn Canvas, sprite: &Sprite, dst: Rect, flip: Flip) {
    draw_frame(canvas, sprite, sprite.frame, dst, flip);
}

/// Render, draw and free a one-shot text texture. Returns the drawn size.
fn draw_text(gs: &GameState, canvas: &mut dyn Canvas, text: &str, pos: Vec2, scale: f64, color: Color) -> Option<Vec2> {
    let font = gs.font?;
    let texture = match canvas.render_text(font, text, color) {
        Ok(texture) => texture,
        Err(err) => {
            warn!(%err, text, "text render failed");
            return None;
        }
    };
    let (w, h) = canvas.texture_size(texture);
    let size = Vec2::new(w as f64, h as f64) * scale;
    canvas.blit(texture, None, Rect::from_pos_size(pos, size), Flip::None);
    canvas.destroy_texture(texture);
    Some(size)
}

fn render_debug_grid(gs: &GameState, canvas: &mut dyn Canvas) {
    let mouse = gs.input.mouse;
    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLUMNS {
            let cell = Rect::new(col as f64 * GRID_SIZE, row as f64 * GRID_SIZE, GRID_SIZE, GRID_SIZE);
            let color = if mouse.is_down(MOUSE_LEFT) && cell.contains_point(mouse.pos) {
                debug!("pos({col} {row})");
                Color::GREEN
            } else {
                Color::RED
            };
            canvas.outline_rect(cell, color);
        }
    }
}

/// Platform and ladder art is picked by level rather than animated.
fn level_frame(gs: &GameState, id: SpriteId) -> u8 {
    gs.level % gs.sprites.get(id).frames.max(1)
}

fn render_platforms(gs: &GameState, canvas: &mut dyn Canvas) {
    let sprite = gs.sprites.get(SpriteId::Platform);
    let frame = level_frame(gs, SpriteId::Platform);
    for platform in &gs.platforms {
        let tiles = (platform.size.x / GRID_SIZE) as u32;
        for x in 0..tiles {
            let dst = Rect::new(platform.pos.x + x as f64 * GRID_SIZE, platform.pos.y, GRID_SIZE, platform.size.y);
            draw_frame(canvas, sprite, frame, dst, Flip::None);
        }
    }
}

fn render_ladders(gs: &GameState, canvas: &mut dyn Canvas) {
    let sprite = gs.sprites.get(SpriteId::Ladder);
    let frame = level_frame(gs, SpriteId::Ladder);
    for ladder in &gs.ladders {
        let tiles = (ladder.size.y / GRID_SIZE) as u32;
        for y in 0..tiles {
            let dst = Rect::new(ladder.pos.x, ladder.pos.y + y as f64 * GRID_SIZE, ladder.size.x, GRID_SIZE);
            draw_frame(canvas, sprite, frame, dst, Flip::None);
        }
    }
}

fn render_collectibles(gs: &GameState, canvas: &mut dyn Canvas) {
    let sprite = gs.sprites.get(SpriteId::Collectible);
    for collectible in &gs.collectibles {
        draw_sprite(canvas, sprite, collectible.rect(), Flip::None);
    }
}

fn facing(entity: &Entity) -> Flip {
    if entity.vel.x < 0.0 {
        Flip::Horizontal
    } else {
        Flip::None
    }
}

fn render_barrels(gs: &GameState, canvas: &mut dyn Canvas) {
    let sprite = gs.sprites.get(SpriteId::Barrel);
    for barrel in &gs.barrels {
        draw_sprite(canvas, sprite, barrel.body.rect(), facing(&barrel.body));
    }
}

fn render_ui(gs: &GameState, canvas: &mut dyn Canvas) {
    if gs.level == crate::config::LEVEL_MENU {
        render_leaderboard(gs, canvas);
    } else if gs.is_name_entry() {
        render_name_prompt(gs, canvas);
    } else {
        render_hud(gs, canvas);
    }
}

/// Lines of the current leaderboard page, ranked from 1.
pub fn leaderboard_lines(gs: &GameState) -> Vec<String> {
    let offset = gs.leaderboard_page as usize * PAGE_SIZE;
    gs.leaderboard
        .iter()
        .enumerate()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(|(i, entry)| format!("{:2}. {} - {}", i + 1, entry.name, entry.score))
        .collect()
}

fn render_leaderboard(gs: &GameState, canvas: &mut dyn Canvas) {
    let Some(font) = gs.font else {
        return;
    };
    let color = level_color(gs.level);
    let mut pos = Vec2::new(GRID_SIZE * 14.0, GRID_SIZE * 4.0);
    for line in leaderboard_lines(gs) {
        let Ok(texture) = canvas.render_text(font, &line, color) else {
            continue;
        };
        let (w, h) = canvas.texture_size(texture);
        let size = Vec2::new(w as f64, h as f64) * LEADERBOARD_SCALE;
        pos.y += size.y;
        canvas.blit(texture, None, Rect::from_pos_size(pos, size), Flip::None);
        canvas.destroy_texture(texture);
    }
}

fn render_name_prompt(gs: &GameState, canvas: &mut dyn Canvas) {
    let name = gs.leaderboard.last().map(|e| e.name.as_str()).unwrap_or_default();
    let text = format!("Enter your name: {name}");
    let Some(font) = gs.font else {
        return;
    };
    let Ok(texture) = canvas.render_text(font, &text, level_color(gs.level)) else {
        return;
    };
    let (w, h) = canvas.texture_size(texture);
    let size = Vec2::new(w as f64, h as f64) * NAME_PROMPT_SCALE;
    let pos = Vec2::new(GRID_SIZE * 2.0, GRID_SIZE * 4.0 + size.y);
    canvas.blit(texture, None, Rect::from_pos_size(pos, size), Flip::None);
    canvas.destroy_texture(texture);
}

pub fn format_play_time(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    format!("Time {}:{:02}", whole / 60, whole % 60)
}

fn render_hud(gs: &GameState, canvas: &mut dyn Canvas) {
    let color = level_color(gs.level);
    let size = Vec2::new(GRID_SIZE * 4.0, GRID_SIZE * 2.0);
    let panel = Rect::from_pos_size(Vec2::new(SCREEN_WIDTH - HUD_BORDER * 2.0 - size.x, HUD_BORDER * 2.0), size);
    canvas.fill_rect(panel, color);

    let inner = Rect::from_pos_size(
        panel.pos + Vec2::splat(HUD_BORDER),
        panel.size - Vec2::splat(HUD_BORDER * 2.0),
    );
    canvas.fill_rect(inner, Color::BLACK);

    let mut pos = inner.pos + Vec2::splat(HUD_BORDER);
    let lines = [
        format!("Score {}", gs.score),
        format!("Lives {}", gs.lives),
        format_play_time(gs.play_time),
    ];
    for line in &lines {
        if let Some(drawn) = draw_text(gs, canvas, line, pos, 1.0, color) {
            pos.y += drawn.y + HUD_BORDER;
        }
    }
}

fn render_woman(gs: &GameState, canvas: &mut dyn Canvas) {
    let flip = if gs.player.center().x < gs.woman.center().x {
        Flip::Horizontal
    } else {
        Flip::None
    };
    draw_sprite(canvas, gs.sprites.get(SpriteId::Woman), gs.woman.rect(), flip);
}

fn render_enemy(gs: &GameState, canvas: &mut dyn Canvas) {
    draw_sprite(canvas, gs.sprites.get(SpriteId::EnemyIdle), gs.enemy.rect(), Flip::None);
}

/// Pose for the player: airborne picks jump or fall by vertical direction,
/// grounded picks run or idle by horizontal motion.
pub fn player_pose(gs: &GameState) -> (SpriteId, Flip) {
    let grounded = physics::can_jump(&gs.player, &gs.platforms);
    let mut dir = gs.player.vel;
    if grounded {
        dir.y = 0.0;
    }
    let dir = dir.normalized();

    let id = if !grounded {
        if dir.y > 0.0 {
            SpriteId::PlayerFall
        } else if dir.y < 0.0 {
            SpriteId::PlayerJump
        } else {
            SpriteId::PlayerIdle
        }
    } else if dir.x != 0.0 {
        SpriteId::PlayerRun
    } else {
        SpriteId::PlayerIdle
    };

    let flip = if dir.x < 0.0 { Flip::Horizontal } else { Flip::None };
    (id, flip)
}

fn render_player(gs: &GameState, canvas: &mut dyn Canvas) {
    let (id, flip) = player_pose(gs);
    draw_sprite(canvas, gs.sprites.get(id), gs.player.rect(), flip);
}

/// Age, expire and draw floating texts. Textures are rasterized on first draw
/// and freed on expiry.
fn render_floating_texts(gs: &mut GameState, canvas: &mut dyn Canvas) {
    let delta = gs.delta;
    let font = gs.font;
    let mut i = 0;
    while i < gs.floating_texts.len() {
        let text = &mut gs.floating_texts[i];
        text.elapsed += delta;
        if text.elapsed >= text.duration {
            if let Some(texture) = text.texture {
                canvas.destroy_texture(texture);
            }
            gs.floating_texts.remove(i);
            continue;
        }

        if text.texture.is_none() {
            if let Some(font) = font {
                match canvas.render_text(font, &text.text, Color::WHITE) {
                    Ok(texture) => text.texture = Some(texture),
                    Err(err) => warn!(%err, "floating text render failed"),
                }
            }
        }

        if let Some(texture) = text.texture {
            let (w, h) = canvas.texture_size(texture);
            let dst = Rect::from_pos_size(text.pos, Vec2::new(w as f64, h as f64));
            canvas.blit(texture, None, dst, Flip::None);
        }
        i += 1;
    }
}
