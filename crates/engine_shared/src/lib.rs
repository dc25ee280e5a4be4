// crates/engine_shared/src/lib.rs
//! Types shared across the host <-> simulation module boundary.
//!
//! Anything in here is part of the reload contract: changing a type that
//! crosses the boundary means bumping `ENGINE_API_VERSION`.

pub mod input_types;
pub mod math;
pub mod plugin_api;
pub mod render_api;

pub use input_types::{Action, GameEvent, InputState, Key, MouseState, MOUSE_LEFT, MOUSE_RIGHT};
pub use math::{Rect, Vec2Ext};
pub use plugin_api::{
    calculate_layout_hash, FrameStatus, ModuleError, SimulationModule, StateEnvelope, StateError, SNAPSHOT_MAGIC_HEADER,
};
pub use render_api::{
    estimate_text_size, Canvas, Color, DrawCommand, Flip, FontId, HeadlessCanvas, ResourceError, TextureId, TextureKind,
};

pub use glam::DVec2 as Vec2;

/// Bumped whenever a type crossing the host/module boundary changes shape.
pub const ENGINE_API_VERSION: u32 = 3;

/// Font name every host maps to its built-in face.
pub const BUILTIN_FONT: &str = "builtin";

/// Asset directory handed from the launcher to the module.
pub const ASSETS_DIR_ENV: &str = "KING_DONKEY_ASSETS";
