// crates/game_plugin/src/config.rs
//! Tunables and asset locations.

use std::path::{Path, PathBuf};

use engine_shared::Color;
use serde::{Deserialize, Serialize};

// --- GRID & SCREEN ---
pub const GRID_SIZE: f64 = 30.0;
pub const GRID_COLUMNS: u32 = 32;
pub const GRID_ROWS: u32 = 24;
pub const SCREEN_WIDTH: f64 = GRID_SIZE * GRID_COLUMNS as f64;
pub const SCREEN_HEIGHT: f64 = GRID_SIZE * GRID_ROWS as f64;

// --- TIME ---
pub const TIME_SCALE_MAX: f64 = 10.0;
pub const FRAME_LIMIT_HZ: u32 = 120;

// --- UI ---
pub const PAGE_SIZE: usize = 10;
pub const NAME_LENGTH: usize = 16;

// --- PHYSICS (grid cells per second, scaled by GRID_SIZE at use) ---
pub const GRAVITY: f64 = 38.0;
pub const PLAYER_SPEED: f64 = 12.0;
pub const PLAYER_JUMP: f64 = 14.0;
pub const LADDER_SPEED_DIVISOR: f64 = 1.5;
pub const ENEMY_JUMP: f64 = 13.0;
pub const BARREL_SPEED: f64 = 4.0;
/// Horizontal velocity multiplier applied every physics step.
pub const HORIZONTAL_DAMPING: f64 = 0.8;

// --- SCORING ---
pub const COLLECTIBLE_SCORE: u32 = 100;
pub const BARREL_SCORE: u32 = 150;
pub const LEVEL_SCORE: u32 = 1000;
pub const STARTING_LIVES: u8 = 3;
pub const FLOATING_TEXT_SECS: f64 = 1.0;

// --- ENEMY AI ---
pub const ENEMY_THROW_COOLDOWN: f64 = 3.5;
pub const ENEMY_JUMP_COOLDOWN: f64 = ENEMY_THROW_COOLDOWN;

// --- SPRITES ---
/// Source pixel width of one animation frame in a sprite sheet.
pub const SPRITE_SIZE: f64 = 30.0;

// --- LEVELS ---
pub const LEVEL_MENU: u8 = 0;
pub const LEVEL_GAME_OVER: u8 = 4;

/// Level palette, indexed by `level % len`.
pub const LEVEL_COLORS: [Color; 4] = [
    Color::hex(0x9a65bf),
    Color::hex(0xbf7465),
    Color::hex(0x65bf6a),
    Color::hex(0x6594bf),
];

pub fn level_color(level: u8) -> Color {
    LEVEL_COLORS[level as usize % LEVEL_COLORS.len()]
}

pub use engine_shared::{ASSETS_DIR_ENV, BUILTIN_FONT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub assets_dir: PathBuf,
    pub leaderboard_file: String,
    /// File under `assets_dir`, or `BUILTIN_FONT`.
    pub font: String,
    pub font_size: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            leaderboard_file: "leaderboard.kd".to_string(),
            font: BUILTIN_FONT.to_string(),
            font_size: (GRID_SIZE / 2.0) as u16,
        }
    }
}

impl GameConfig {
    pub fn with_assets_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            assets_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Defaults, with the asset directory taken from `ASSETS_DIR_ENV` if set.
    pub fn from_env() -> Self {
        match std::env::var_os(ASSETS_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::with_assets_dir(dir),
            _ => Self::default(),
        }
    }

    pub fn level_path(&self, level: u8) -> PathBuf {
        self.assets_dir.join(format!("level{level}.kd"))
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.assets_dir.join(&self.leaderboard_file)
    }
}
