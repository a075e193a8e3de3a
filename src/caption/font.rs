//! Caption font resolution and text drawing.
//!
//! Fonts come from an ordered list of [`FontSource`] strategies supplied by the
//! caller. The first source that yields a usable TrueType/OpenType font wins;
//! when none does, the built-in Spleen bitmap font is used, so resolution never
//! fails.
//!
//! [`default_sources`] holds the bundled DejaVu Sans, so captions are
//! anti-aliased without any system fonts installed.

use std::fmt;
use std::path::PathBuf;

use ab_glyph::{Font, FontArc, ScaleFont};
use image::{Rgb, RgbImage};
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};
use tracing::debug;

/// A strategy for obtaining an outline font.
pub trait FontSource: Send + Sync {
    /// Try to produce a font. `None` moves resolution on to the next source.
    fn load(&self) -> Option<FontArc>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Load a font file from disk.
#[derive(Debug, Clone)]
pub struct FontFile(pub PathBuf);

impl FontSource for FontFile {
    fn load(&self) -> Option<FontArc> {
        let bytes = std::fs::read(&self.0).ok()?;
        FontArc::try_from_vec(bytes).ok()
    }

    fn describe(&self) -> String {
        self.0.display().to_string()
    }
}

/// A font already held in memory.
#[derive(Clone)]
pub struct FontBytes(pub Vec<u8>);

impl FontSource for FontBytes {
    fn load(&self) -> Option<FontArc> {
        FontArc::try_from_vec(self.0.clone()).ok()
    }

    fn describe(&self) -> String {
        format!("<{} bytes in memory>", self.0.len())
    }
}

/// DejaVu Sans, compiled into the binary.
const EMBEDDED_FONT: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");

/// The bundled outline font.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFont;

impl FontSource for EmbeddedFont {
    fn load(&self) -> Option<FontArc> {
        FontArc::try_from_slice(EMBEDDED_FONT).ok()
    }

    fn describe(&self) -> String {
        "bundled DejaVu Sans".into()
    }
}

/// Sources tried when the caller supplies none of its own.
pub fn default_sources() -> Vec<Box<dyn FontSource>> {
    vec![Box::new(EmbeddedFont)]
}

/// Walk `sources` in order and return the first font that loads.
pub fn resolve(sources: &[Box<dyn FontSource>]) -> CaptionFont {
    for source in sources {
        match source.load() {
            Some(font) => {
                debug!(source = %source.describe(), "Caption font resolved");
                return CaptionFont::Outline(font);
            }
            None => debug!(source = %source.describe(), "Caption font unavailable, trying next"),
        }
    }

    debug!("Using built-in bitmap caption font");
    CaptionFont::Bitmap
}

/// Spleen face used by the bitmap fallback.
#[derive(Debug, Clone, Copy)]
struct BitmapFace {
    data: &'static [u8],
    width: u32,
    height: u32,
}

const SMALL_FACE: BitmapFace = BitmapFace {
    data: FONT_6X12,
    width: 6,
    height: 12,
};

const LARGE_FACE: BitmapFace = BitmapFace {
    data: FONT_12X24,
    width: 12,
    height: 24,
};

/// Pick a Spleen face and integer scale for a pixel height.
fn bitmap_face(pixel_height: f32) -> (BitmapFace, u32) {
    let face = if pixel_height < 18.0 { SMALL_FACE } else { LARGE_FACE };
    let scale = (pixel_height / face.height as f32).round().max(1.0) as u32;
    (face, scale)
}

/// A resolved caption font.
#[derive(Clone)]
pub enum CaptionFont {
    /// Anti-aliased outline font
    Outline(FontArc),
    /// Built-in Spleen bitmap font
    Bitmap,
}

impl fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptionFont::Outline(_) => f.write_str("CaptionFont::Outline"),
            CaptionFont::Bitmap => f.write_str("CaptionFont::Bitmap"),
        }
    }
}

impl CaptionFont {
    /// Advance width of `text` in pixels.
    pub fn text_width(&self, text: &str, pixel_height: f32) -> u32 {
        match self {
            CaptionFont::Outline(font) => {
                let scaled = font.as_scaled(pixel_height);
                let width: f32 = text.chars().map(|ch| scaled.h_advance(font.glyph_id(ch))).sum();
                width.ceil() as u32
            }
            CaptionFont::Bitmap => {
                let (face, scale) = bitmap_face(pixel_height);
                (text.chars().count() as u32)
                    .saturating_mul(face.width)
                    .saturating_mul(scale)
            }
        }
    }

    /// Height of one line of text in pixels.
    pub fn line_height(&self, pixel_height: f32) -> u32 {
        match self {
            CaptionFont::Outline(font) => {
                let scaled = font.as_scaled(pixel_height);
                (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32
            }
            CaptionFont::Bitmap => {
                let (face, scale) = bitmap_face(pixel_height);
                face.height.saturating_mul(scale)
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the canvas are clipped.
    pub fn draw_text(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: i64,
        y: i64,
        pixel_height: f32,
        color: Rgb<u8>,
    ) {
        match self {
            CaptionFont::Outline(font) => draw_outline(font, canvas, text, x, y, pixel_height, color),
            CaptionFont::Bitmap => draw_bitmap(canvas, text, x, y, pixel_height, color),
        }
    }
}

/// Mix `color` into the pixel at `(x, y)` by `coverage` (0.0..=1.0).
fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f32 * (1.0 - coverage) + src as f32 * coverage).round() as u8;
    }
}

fn draw_outline(
    font: &FontArc,
    canvas: &mut RgbImage,
    text: &str,
    x: i64,
    y: i64,
    pixel_height: f32,
    color: Rgb<u8>,
) {
    let scaled = font.as_scaled(pixel_height);
    let baseline = y as f32 + scaled.ascent();
    let mut caret = x as f32;
    let (width, height) = (canvas.width() as f32, canvas.height() as f32);

    for ch in text.chars() {
        if caret >= width {
            break;
        }
        let glyph_id = font.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(pixel_height, ab_glyph::point(caret, baseline));
        caret += scaled.h_advance(glyph_id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            if bounds.max.x <= 0.0 || bounds.max.y <= 0.0 || bounds.min.y >= height {
                continue;
            }
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                blend(canvas, px, py, color, coverage);
            });
        }
    }
}

fn draw_bitmap(canvas: &mut RgbImage, text: &str, x: i64, y: i64, pixel_height: f32, color: Rgb<u8>) {
    let (face, scale) = bitmap_face(pixel_height);
    let Ok(mut spleen) = PSF2Font::new(face.data) else {
        return;
    };
    let s = scale as i64;
    let advance = face.width as i64 * s;
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    for (index, ch) in text.chars().enumerate() {
        let origin_x = x.saturating_add((index as i64).saturating_mul(advance));
        if origin_x >= width {
            break;
        }
        if origin_x.saturating_add(advance) <= 0 {
            continue;
        }
        let utf8 = ch.to_string();

        let mut on_cells = Vec::new();
        match spleen.glyph_for_utf8(utf8.as_bytes()) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if on {
                            on_cells.push((col_x as i64, row_y as i64));
                        }
                    }
                }
            }
            // Unknown chars get a box outline
            None if !ch.is_whitespace() => {
                let (w, h) = (face.width as i64, face.height as i64);
                for cx in 0..w {
                    on_cells.push((cx, 0));
                    on_cells.push((cx, h - 1));
                }
                for cy in 0..h {
                    on_cells.push((0, cy));
                    on_cells.push((w - 1, cy));
                }
            }
            None => {}
        }

        for (cx, cy) in on_cells {
            let cell_x = origin_x.saturating_add(cx.saturating_mul(s));
            let cell_y = y.saturating_add(cy.saturating_mul(s));
            let xs = cell_x.max(0)..cell_x.saturating_add(s).min(width);
            let ys = cell_y.max(0)..cell_y.saturating_add(s).min(height);
            for py in ys {
                for px in xs.clone() {
                    blend(canvas, px, py, color, 1.0);
                }
            }
        }
    }
}
