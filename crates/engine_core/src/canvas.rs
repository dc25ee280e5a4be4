// crates/engine_core/src/canvas.rs
//! The host side of the render contract.
//!
//! `EguiCanvas` owns every texture and font the module asks for. Draw calls
//! are resolved into `Paint` records when they are issued (text textures are
//! often destroyed right after their blit) and replayed once per frame onto an
//! egui background layer, letterboxed into the window.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use egui::{Color32, FontFamily, LayerId, Pos2, Stroke, TextureHandle, TextureOptions};
use tracing::{debug, info};

use engine_shared::{estimate_text_size, Canvas, Color, Flip, FontId, Rect, ResourceError, TextureId, Vec2, BUILTIN_FONT};

/// Size of the module's coordinate space, in logical pixels.
pub const LOGICAL_WIDTH: f32 = 960.0;
pub const LOGICAL_HEIGHT: f32 = 720.0;

enum CanvasTexture {
    Image(TextureHandle),
    Text {
        text: String,
        color: Color32,
        family: FontFamily,
        size: (u32, u32),
    },
}

struct CanvasFont {
    family: FontFamily,
    point_size: u16,
}

enum Paint {
    Fill { rect: Rect, color: Color32 },
    Outline { rect: Rect, color: Color32 },
    Image { texture: egui::TextureId, uv: egui::Rect, dst: Rect },
    Text { text: String, color: Color32, family: FontFamily, dst: Rect },
}

/// Maps module coordinates onto the window, preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Pos2,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn fit(screen: egui::Rect) -> Self {
        let scale = (screen.width() / LOGICAL_WIDTH).min(screen.height() / LOGICAL_HEIGHT).max(f32::EPSILON);
        let used = egui::vec2(LOGICAL_WIDTH, LOGICAL_HEIGHT) * scale;
        Self {
            origin: screen.center() - used / 2.0,
            scale,
        }
    }

    pub fn to_screen(&self, rect: &Rect) -> egui::Rect {
        let min = self.origin + egui::vec2(rect.pos.x as f32, rect.pos.y as f32) * self.scale;
        egui::Rect::from_min_size(min, egui::vec2(rect.size.x as f32, rect.size.y as f32) * self.scale)
    }

    pub fn to_logical(&self, point: Pos2) -> Vec2 {
        let p = (point - self.origin) / self.scale;
        Vec2::new(p.x as f64, p.y as f64)
    }

    pub fn bounds(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.origin, egui::vec2(LOGICAL_WIDTH, LOGICAL_HEIGHT) * self.scale)
    }
}

fn color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Pure black is the sprite sheets' transparent key.
pub fn apply_color_key(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        if px[0] == 0 && px[1] == 0 && px[2] == 0 {
            px[3] = 0;
        }
    }
}

/// Normalized source rectangle, mirrored for a horizontal flip.
pub fn uv_rect(src: Option<&Rect>, texture_size: [usize; 2], flip: Flip) -> egui::Rect {
    let (w, h) = (texture_size[0].max(1) as f32, texture_size[1].max(1) as f32);
    let mut uv = match src {
        Some(r) => egui::Rect::from_min_max(
            egui::pos2(r.left() as f32 / w, r.top() as f32 / h),
            egui::pos2(r.right() as f32 / w, r.bottom() as f32 / h),
        ),
        None => egui::Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
    };
    if flip == Flip::Horizontal {
        std::mem::swap(&mut uv.min.x, &mut uv.max.x);
    }
    uv
}

pub struct EguiCanvas {
    ctx: egui::Context,
    assets_dir: PathBuf,
    textures: HashMap<TextureId, CanvasTexture>,
    fonts: HashMap<FontId, CanvasFont>,
    font_defs: egui::FontDefinitions,
    next_id: u32,
    commands: Vec<Paint>,
    viewport: Viewport,
}

impl EguiCanvas {
    pub fn new(ctx: egui::Context, assets_dir: impl AsRef<Path>) -> Self {
        Self {
            ctx,
            assets_dir: assets_dir.as_ref().to_path_buf(),
            textures: HashMap::new(),
            fonts: HashMap::new(),
            font_defs: egui::FontDefinitions::default(),
            next_id: 0,
            commands: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Viewport used by the last `paint`, for mapping the cursor back.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Drop every texture. Used when the module dies without releasing them.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.fonts.clear();
        self.commands.clear();
    }

    fn register_font_file(&mut self, name: &str) -> Result<FontFamily, ResourceError> {
        let path = self.assets_dir.join(name);
        let bytes = fs::read(&path).map_err(|_| ResourceError::Missing(path.display().to_string()))?;

        let mut fallback = self
            .font_defs
            .families
            .get(&FontFamily::Monospace)
            .cloned()
            .unwrap_or_default();
        fallback.insert(0, name.to_string());

        self.font_defs
            .font_data
            .insert(name.to_string(), egui::FontData::from_owned(bytes));
        let family = FontFamily::Name(name.into());
        self.font_defs.families.insert(family.clone(), fallback);
        self.ctx.set_fonts(self.font_defs.clone());

        info!(font = name, "font registered");
        Ok(family)
    }

    /// Replay the recorded frame onto the background layer.
    pub fn paint(&mut self, ctx: &egui::Context) {
        self.viewport = Viewport::fit(ctx.screen_rect());
        let view = self.viewport;
        let painter = ctx.layer_painter(LayerId::background()).with_clip_rect(view.bounds());

        painter.rect_filled(view.bounds(), 0.0, Color32::BLACK);

        for paint in self.commands.drain(..) {
            match paint {
                Paint::Fill { rect, color } => {
                    painter.rect_filled(view.to_screen(&rect), 0.0, color);
                }
                Paint::Outline { rect, color } => {
                    painter.rect_stroke(view.to_screen(&rect), 0.0, Stroke::new(view.scale.max(1.0), color));
                }
                Paint::Image { texture, uv, dst } => {
                    painter.image(texture, view.to_screen(&dst), uv, Color32::WHITE);
                }
                Paint::Text {
                    text,
                    color,
                    family,
                    dst,
                } => {
                    let dst = view.to_screen(&dst);
                    let font = egui::FontId::new(dst.height(), family);
                    painter.text(dst.min, egui::Align2::LEFT_TOP, text, font, color);
                }
            }
        }
    }
}

impl Canvas for EguiCanvas {
    fn load_texture(&mut self, name: &str) -> Result<TextureId, ResourceError> {
        let path = self.assets_dir.join(format!("{name}.bmp"));
        if !path.is_file() {
            return Err(ResourceError::Missing(path.display().to_string()));
        }

        let mut rgba = image::open(&path)
            .map_err(|e| ResourceError::Decode {
                name: name.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        apply_color_key(&mut rgba);

        let size = [rgba.width() as usize, rgba.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let handle = self.ctx.load_texture(name, image, TextureOptions::NEAREST);

        let id = self.alloc_id();
        self.textures.insert(id, CanvasTexture::Image(handle));
        debug!(name, id, ?size, "texture loaded");
        Ok(id)
    }

    fn open_font(&mut self, name: &str, point_size: u16) -> Result<FontId, ResourceError> {
        let family = if name == BUILTIN_FONT {
            FontFamily::Monospace
        } else {
            self.register_font_file(name)?
        };
        let id = self.alloc_id();
        self.fonts.insert(id, CanvasFont { family, point_size });
        Ok(id)
    }

    fn close_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    fn render_text(&mut self, font: FontId, text: &str, color: Color) -> Result<TextureId, ResourceError> {
        let font = self.fonts.get(&font).ok_or(ResourceError::UnknownFont(font))?;
        let texture = CanvasTexture::Text {
            text: text.to_string(),
            color: color32(color),
            family: font.family.clone(),
            size: estimate_text_size(text, font.point_size),
        };
        let id = self.alloc_id();
        self.textures.insert(id, texture);
        Ok(id)
    }

    fn texture_size(&self, texture: TextureId) -> (u32, u32) {
        match self.textures.get(&texture) {
            Some(CanvasTexture::Image(handle)) => {
                let [w, h] = handle.size();
                (w as u32, h as u32)
            }
            Some(CanvasTexture::Text { size, .. }) => *size,
            None => (0, 0),
        }
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(Paint::Fill {
            rect,
            color: color32(color),
        });
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(Paint::Outline {
            rect,
            color: color32(color),
        });
    }

    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect, flip: Flip) {
        let paint = match self.textures.get(&texture) {
            Some(CanvasTexture::Image(handle)) => Paint::Image {
                texture: handle.id(),
                uv: uv_rect(src.as_ref(), handle.size(), flip),
                dst,
            },
            Some(CanvasTexture::Text {
                text, color, family, ..
            }) => Paint::Text {
                text: text.clone(),
                color: *color,
                family: family.clone(),
                dst,
            },
            None => {
                debug!(texture, "blit of unknown texture skipped");
                return;
            }
        };
        self.commands.push(paint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_with_strip() -> (tempfile::TempDir, EguiCanvas) {
        let dir = tempfile::tempdir().unwrap();
        let strip = image::RgbImage::from_fn(60, 30, |x, _| if x < 30 { image::Rgb([0, 0, 0]) } else { image::Rgb([200, 10, 10]) });
        strip.save(dir.path().join("strip.bmp")).unwrap();
        let canvas = EguiCanvas::new(egui::Context::default(), dir.path());
        (dir, canvas)
    }

    #[test]
    fn loads_bmp_strips() {
        let (_dir, mut canvas) = canvas_with_strip();
        let id = canvas.load_texture("strip").unwrap();
        assert_eq!(canvas.texture_size(id), (60, 30));
        canvas.destroy_texture(id);
        assert_eq!(canvas.texture_size(id), (0, 0));
        assert_eq!(canvas.live_textures(), 0);
    }

    #[test]
    fn missing_sheet_and_font_are_errors() {
        let (_dir, mut canvas) = canvas_with_strip();
        assert!(matches!(canvas.load_texture("nope"), Err(ResourceError::Missing(_))));
        assert!(matches!(canvas.open_font("nope.ttf", 12), Err(ResourceError::Missing(_))));
        assert!(matches!(canvas.render_text(99, "x", Color::WHITE), Err(ResourceError::UnknownFont(99))));
    }

    #[test]
    fn text_survives_destroy_after_blit() {
        let (_dir, mut canvas) = canvas_with_strip();
        let font = canvas.open_font(BUILTIN_FONT, 15).unwrap();
        let text = canvas.render_text(font, "Score 100", Color::WHITE).unwrap();
        assert_eq!(canvas.texture_size(text), estimate_text_size("Score 100", 15));
        canvas.blit(text, None, Rect::new(0.0, 0.0, 90.0, 15.0), Flip::None);
        canvas.destroy_texture(text);
        canvas.blit(text, None, Rect::new(0.0, 0.0, 90.0, 15.0), Flip::None);
        assert_eq!(canvas.pending_commands(), 1);
    }

    #[test]
    fn black_is_transparent() {
        let mut px = [0, 0, 0, 255, 1, 0, 0, 255];
        apply_color_key(&mut px);
        assert_eq!(px, [0, 0, 0, 0, 1, 0, 0, 255]);
    }

    #[test]
    fn uv_selects_and_mirrors_frames() {
        let frame = Rect::new(30.0, 0.0, 30.0, 30.0);
        let uv = uv_rect(Some(&frame), [60, 30], Flip::None);
        assert_eq!(uv, egui::Rect::from_min_max(egui::pos2(0.5, 0.0), egui::pos2(1.0, 1.0)));
        let flipped = uv_rect(Some(&frame), [60, 30], Flip::Horizontal);
        assert_eq!(flipped.min.x, 1.0);
        assert_eq!(flipped.max.x, 0.5);
    }

    #[test]
    fn viewport_letterboxes_and_inverts() {
        let screen = egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(1920.0, 1080.0));
        let view = Viewport::fit(screen);
        assert_eq!(view.scale, 1.5);
        assert_eq!(view.origin, egui::pos2(240.0, 0.0));

        let cell = view.to_screen(&Rect::new(30.0, 30.0, 30.0, 30.0));
        assert_eq!(cell.min, egui::pos2(285.0, 45.0));
        assert_eq!(view.to_logical(cell.min), Vec2::new(30.0, 30.0));
    }
}
