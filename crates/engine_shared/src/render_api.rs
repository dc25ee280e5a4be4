// crates/engine_shared/src/render_api.rs
//! The render surface the simulation module draws into.
//!
//! The module never owns pixels or GPU objects. It asks the host's `Canvas`
//! for texture and font handles and issues draw calls against it; the host
//! decides how those calls reach the screen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Rect;

pub type TextureId = u32;
pub type FontId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("asset not found: {0}")]
    Missing(String),
    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("unknown font handle {0}")]
    UnknownFont(FontId),
}

/// Approximate size of rendered text for a monospace face at `point_size`.
/// Hosts use the same estimate so layout agrees between headless and live runs.
pub fn estimate_text_size(text: &str, point_size: u16) -> (u32, u32) {
    let glyph_w = (point_size as f32 * 0.6).ceil() as u32;
    (glyph_w * text.chars().count() as u32, point_size as u32)
}

/// The external renderer + resource manager, as seen by the game.
pub trait Canvas {
    /// Load the sprite sheet registered under `name`.
    fn load_texture(&mut self, name: &str) -> Result<TextureId, ResourceError>;

    fn open_font(&mut self, name: &str, point_size: u16) -> Result<FontId, ResourceError>;

    fn close_font(&mut self, font: FontId);

    /// Rasterize `text` into a new texture owned by the caller until destroyed.
    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<TextureId, ResourceError>;

    /// Pixel size of a texture; zero for unknown handles.
    fn texture_size(&self, texture: TextureId) -> (u32, u32);

    fn destroy_texture(&mut self, texture: TextureId);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn outline_rect(&mut self, rect: Rect, color: Color);

    /// Copy `src` (whole texture when `None`) of `texture` into `dst`.
    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect, flip: Flip);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Color },
    OutlineRect { rect: Rect, color: Color },
    Blit {
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        flip: Flip,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureKind {
    Sheet(String),
    Text { text: String, color: Color, point_size: u16 },
}

#[derive(Debug, Clone)]
struct HeadlessTexture {
    kind: TextureKind,
    size: (u32, u32),
}

/// A canvas that records draw calls and hands out fake texture handles.
/// Used by tests and by anything that wants to run the game without a window.
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    textures: HashMap<TextureId, HeadlessTexture>,
    /// Kinds of destroyed textures, so recorded blits stay inspectable.
    retired: HashMap<TextureId, TextureKind>,
    fonts: HashMap<FontId, u16>,
    next_id: u32,
    /// Sheet names `load_texture` refuses, to exercise failure paths.
    pub missing: Vec<String>,
    pub commands: Vec<DrawCommand>,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn open_fonts(&self) -> usize {
        self.fonts.len()
    }

    pub fn texture_kind(&self, texture: TextureId) -> Option<&TextureKind> {
        self.textures.get(&texture).map(|t| &t.kind)
    }

    /// Texts of every blit whose texture is a rendered string, in draw order,
    /// including textures destroyed since.
    pub fn drawn_texts(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Blit { texture, .. } => match self.texture_kind(*texture).or(self.retired.get(texture)) {
                    Some(TextureKind::Text { text, .. }) => Some(text.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for HeadlessCanvas {
    fn load_texture(&mut self, name: &str) -> Result<TextureId, ResourceError> {
        if self.missing.iter().any(|m| m == name) {
            return Err(ResourceError::Missing(name.to_string()));
        }
        let id = self.alloc_id();
        self.textures.insert(
            id,
            HeadlessTexture {
                kind: TextureKind::Sheet(name.to_string()),
                size: (0, 0),
            },
        );
        Ok(id)
    }

    fn open_font(&mut self, name: &str, point_size: u16) -> Result<FontId, ResourceError> {
        if self.missing.iter().any(|m| m == name) {
            return Err(ResourceError::Missing(name.to_string()));
        }
        let id = self.alloc_id();
        self.fonts.insert(id, point_size);
        Ok(id)
    }

    fn close_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<TextureId, ResourceError> {
        let point_size = *self.fonts.get(&font).ok_or(ResourceError::UnknownFont(font))?;
        let id = self.alloc_id();
        self.textures.insert(
            id,
            HeadlessTexture {
                kind: TextureKind::Text {
                    text: text.to_string(),
                    color,
                    point_size,
                },
                size: estimate_text_size(text, point_size),
            },
        );
        Ok(id)
    }

    fn texture_size(&self, texture: TextureId) -> (u32, u32) {
        self.textures.get(&texture).map(|t| t.size).unwrap_or((0, 0))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(dead) = self.textures.remove(&texture) {
            self.retired.insert(texture, dead.kind);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::OutlineRect { rect, color });
    }

    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect, flip: Flip) {
        self.commands.push(DrawCommand::Blit { texture, src, dst, flip });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_unpacks_channels() {
        assert_eq!(Color::hex(0x9a65bf), Color::rgb(0x9a, 0x65, 0xbf));
    }

    #[test]
    fn text_textures_track_lifetime() {
        let mut canvas = HeadlessCanvas::new();
        let font = canvas.open_font("builtin", 15).unwrap();
        let tex = canvas.render_text(font, "100", Color::WHITE).unwrap();
        assert_eq!(canvas.texture_size(tex), estimate_text_size("100", 15));
        assert_eq!(canvas.live_textures(), 1);

        canvas.destroy_texture(tex);
        assert_eq!(canvas.live_textures(), 0);
        assert_eq!(canvas.texture_size(tex), (0, 0));
    }

    #[test]
    fn closed_font_cannot_render() {
        let mut canvas = HeadlessCanvas::new();
        let font = canvas.open_font("builtin", 15).unwrap();
        canvas.close_font(font);
        assert!(matches!(
            canvas.render_text(font, "x", Color::WHITE),
            Err(ResourceError::UnknownFont(_))
        ));
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let mut canvas = HeadlessCanvas::new();
        canvas.missing.push("barrel".into());
        assert!(canvas.load_texture("barrel").is_err());
        assert!(canvas.load_texture("ladder").is_ok());
    }
}
