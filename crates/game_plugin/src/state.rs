// crates/game_plugin/src/state.rs
//! The single aggregate the game mutates every frame.
//!
//! Everything that must survive a module swap is serializable. Presentation
//! handles (sprite textures, the font, the wall clock) are skipped and
//! rebuilt by `lifecycle::post_reload`.

use engine_shared::{FontId, InputState, Rect, TextureId, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::{self, GameConfig, ENEMY_JUMP_COOLDOWN, ENEMY_THROW_COOLDOWN, GRID_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::timing::FrameClock;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Entity {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Barrel {
    pub body: Entity,
    /// Set once the player has scored by jumping over this barrel.
    pub jumped: bool,
}

impl Barrel {
    pub fn spawn_at(pos: Vec2) -> Self {
        Self {
            body: Entity::new(pos, Vec2::splat(GRID_SIZE)),
            jumped: false,
        }
    }
}

/// Transient score popup. The texture is created on first draw and destroyed
/// by the render step when the text expires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub duration: f64,
    pub elapsed: f64,
    pub texture: Option<TextureId>,
}

impl FloatingText {
    pub fn new(text: impl Into<String>, pos: Vec2, duration: f64) -> Self {
        Self {
            pos,
            text: text.into(),
            duration,
            elapsed: 0.0,
            texture: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

// ==================================================================================
// SPRITES
// ==================================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteId {
    PlayerIdle,
    PlayerRun,
    PlayerJump,
    PlayerFall,
    EnemyIdle,
    Woman,
    Barrel,
    Platform,
    Collectible,
    Ladder,
    Heart,
}

/// Declared sheet: asset name, frame count, per-frame duration in ms.
#[derive(Clone, Copy, Debug)]
pub struct SpriteSheet {
    pub id: SpriteId,
    pub name: &'static str,
    pub frames: u8,
    pub duration_ms: f64,
}

const fn sheet(id: SpriteId, name: &'static str, frames: u8, duration_ms: f64) -> SpriteSheet {
    SpriteSheet {
        id,
        name,
        frames,
        duration_ms,
    }
}

/// Ordered by `SpriteId` discriminant.
pub const SPRITE_SHEETS: [SpriteSheet; 11] = [
    sheet(SpriteId::PlayerIdle, "player_idle", 2, 150.0),
    sheet(SpriteId::PlayerRun, "player_run", 2, 150.0),
    sheet(SpriteId::PlayerJump, "player_jump", 2, 150.0),
    sheet(SpriteId::PlayerFall, "player_fall", 2, 150.0),
    sheet(SpriteId::EnemyIdle, "enemy_idle", 1, 150.0),
    sheet(SpriteId::Woman, "woman", 7, 150.0),
    sheet(SpriteId::Barrel, "barrel", 4, 200.0),
    sheet(SpriteId::Platform, "platform", 4, 1.0),
    sheet(SpriteId::Collectible, "collectible", 1, 1.0),
    sheet(SpriteId::Ladder, "ladder", 4, 1.0),
    sheet(SpriteId::Heart, "heart", 2, 1.0),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    #[serde(skip)]
    pub texture: Option<TextureId>,
    pub frames: u8,
    pub frame: u8,
    pub duration: f64,
    pub elapsed: f64,
}

impl Sprite {
    fn from_sheet(sheet: &SpriteSheet) -> Self {
        Self {
            texture: None,
            frames: sheet.frames,
            frame: 0,
            duration: sheet.duration_ms,
            elapsed: 0.0,
        }
    }

    /// Advance by `delta_ms`; one frame step at most per call.
    pub fn advance(&mut self, delta_ms: f64) {
        self.elapsed += delta_ms;
        if self.elapsed >= self.duration {
            self.elapsed = 0.0;
            self.frame = (self.frame + 1) % self.frames.max(1);
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.elapsed = 0.0;
    }
}

/// Named sprite table, one entry per `SPRITE_SHEETS` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    entries: Vec<Sprite>,
}

impl Default for Sprites {
    fn default() -> Self {
        Self {
            entries: SPRITE_SHEETS.iter().map(Sprite::from_sheet).collect(),
        }
    }
}

impl Sprites {
    pub fn get(&self, id: SpriteId) -> &Sprite {
        &self.entries[id as usize]
    }

    pub fn get_mut(&mut self, id: SpriteId) -> &mut Sprite {
        &mut self.entries[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpriteSheet, &Sprite)> {
        SPRITE_SHEETS.iter().zip(self.entries.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SpriteSheet, &mut Sprite)> {
        SPRITE_SHEETS.iter().zip(self.entries.iter_mut())
    }
}

// ==================================================================================
// GAME STATE
// ==================================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    #[serde(skip)]
    pub input: InputState,

    pub debug: bool,
    pub frame_limit: bool,
    pub paused: bool,
    pub time_scale: f64,
    /// Scaled seconds since the previous frame; zero while paused.
    pub delta: f64,
    pub delta_unscaled: f64,
    #[serde(skip)]
    pub clock: FrameClock,

    pub player: Entity,
    pub woman: Entity,
    pub enemy: Entity,
    /// Index 0 is always the full-width ground row.
    pub platforms: Vec<Entity>,
    pub collectibles: Vec<Entity>,
    pub ladders: Vec<Entity>,
    pub barrels: Vec<Barrel>,
    pub floating_texts: Vec<FloatingText>,
    /// Text textures orphaned outside the render pass, freed on the next draw.
    pub discarded_textures: Vec<TextureId>,

    pub play_time: f64,
    pub level: u8,
    pub lives: u8,
    pub score: u32,
    pub enemy_jump_cooldown: f64,
    pub enemy_throw_cooldown: f64,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_page: u16,
    /// Level 1 failed to load from the menu; no retry until the player drops
    /// back below the start line.
    #[serde(skip)]
    pub menu_start_failed: bool,

    pub sprites: Sprites,
    #[serde(skip)]
    pub font: Option<FontId>,
}

/// Schema listing hashed into every exported snapshot. Keep in field order.
pub const STATE_SCHEMA: &str = "config,debug,frame_limit,paused,time_scale,delta,delta_unscaled,\
player,woman,enemy,platforms,collectibles,ladders,barrels{body,jumped},floating_texts{pos,text,duration,elapsed,texture},discarded_textures,\
play_time,level,lives,score,enemy_jump_cooldown,enemy_throw_cooldown,leaderboard{name,score},leaderboard_page,\
sprites{frames,frame,duration,elapsed}";

pub const STATE_VERSION: u32 = 1;

pub fn ground_platform() -> Entity {
    Entity::new(
        Vec2::new(0.0, SCREEN_HEIGHT - GRID_SIZE),
        Vec2::new(SCREEN_WIDTH, GRID_SIZE),
    )
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            input: InputState::default(),
            debug: false,
            frame_limit: false,
            paused: false,
            time_scale: 1.0,
            delta: 0.0,
            delta_unscaled: 0.0,
            clock: FrameClock::default(),
            player: Entity::default(),
            woman: Entity::default(),
            enemy: Entity::default(),
            platforms: vec![ground_platform()],
            collectibles: Vec::new(),
            ladders: Vec::new(),
            barrels: Vec::new(),
            floating_texts: Vec::new(),
            discarded_textures: Vec::new(),
            play_time: 0.0,
            level: config::LEVEL_MENU,
            lives: 0,
            score: 0,
            enemy_jump_cooldown: ENEMY_JUMP_COOLDOWN,
            enemy_throw_cooldown: ENEMY_THROW_COOLDOWN,
            leaderboard: Vec::new(),
            leaderboard_page: 0,
            menu_start_failed: false,
            sprites: Sprites::default(),
            font: None,
        }
    }

    /// Levels 1..=3, where lives, barrels and the rescue goal apply.
    pub fn is_real_level(&self) -> bool {
        self.level > config::LEVEL_MENU && self.level < config::LEVEL_GAME_OVER
    }

    pub fn is_name_entry(&self) -> bool {
        self.level == config::LEVEL_GAME_OVER
    }

    /// Zero every animation counter and restart the enemy cooldowns.
    pub fn reset_animations(&mut self) {
        for (_, sprite) in self.sprites.iter_mut() {
            sprite.reset();
        }
        self.enemy_jump_cooldown = ENEMY_JUMP_COOLDOWN;
        self.enemy_throw_cooldown = ENEMY_THROW_COOLDOWN;
    }

    pub fn show_floating_text(&mut self, text: impl Into<String>, pos: Vec2, duration: f64) {
        self.floating_texts.push(FloatingText::new(text, pos, duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_table_matches_ids() {
        for (i, sheet) in SPRITE_SHEETS.iter().enumerate() {
            assert_eq!(sheet.id as usize, i, "{} out of order", sheet.name);
        }
        let sprites = Sprites::default();
        assert_eq!(sprites.get(SpriteId::Woman).frames, 7);
        assert_eq!(sprites.get(SpriteId::Barrel).duration, 200.0);
    }

    #[test]
    fn sprite_frame_wraps() {
        let mut sprites = Sprites::default();
        let run = sprites.get_mut(SpriteId::PlayerRun);
        run.advance(150.0);
        assert_eq!(run.frame, 1);
        assert_eq!(run.elapsed, 0.0);
        run.advance(100.0);
        assert_eq!(run.frame, 1);
        run.advance(60.0);
        assert_eq!(run.frame, 0);
        assert!(run.frame < run.frames);
    }

    #[test]
    fn fresh_state_has_ground_only() {
        let gs = GameState::new(GameConfig::default());
        assert_eq!(gs.platforms, vec![ground_platform()]);
        assert_eq!(gs.platforms[0].rect().bottom(), SCREEN_HEIGHT);
        assert_eq!(gs.time_scale, 1.0);
        assert!(!gs.is_real_level());
    }

    #[test]
    fn reset_animations_restarts_cooldowns() {
        let mut gs = GameState::new(GameConfig::default());
        gs.sprites.get_mut(SpriteId::Woman).frame = 5;
        gs.enemy_jump_cooldown = 0.1;
        gs.enemy_throw_cooldown = -1.0;
        gs.reset_animations();
        assert_eq!(gs.sprites.get(SpriteId::Woman).frame, 0);
        assert_eq!(gs.enemy_jump_cooldown, ENEMY_JUMP_COOLDOWN);
        assert_eq!(gs.enemy_throw_cooldown, ENEMY_THROW_COOLDOWN);
    }
}
