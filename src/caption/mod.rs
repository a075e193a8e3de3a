//! # Caption Compositor
//!
//! Adds a human-readable caption (the item name) above a rendered symbol.
//!
//! ```text
//! ┌──────────────────────────┐  ┐
//! │       Widget A           │  │ header band (extra_height)
//! ├──────────────────────────┤  ┘
//! │ ║│║║│║│║║║│║│║║│║║│║│║║ │
//! │ ║│║║│║│║║║│║│║║│║║│║│║║ │  source image, unchanged
//! └──────────────────────────┘
//! ```
//!
//! The source image is never modified; compositing always allocates a new
//! canvas.

pub mod font;

use std::borrow::Cow;

use image::{Rgb, RgbImage, imageops};
use thiserror::Error;
use tracing::warn;

use crate::symbol::LayoutMode;
use font::{CaptionFont, FontSource};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Marker appended to truncated captions.
const ELLIPSIS: &str = "...";

/// Extra height and gap used when the code text is appended below a symbol.
const FOOTER_HEIGHT: u32 = 30;
const FOOTER_GAP: u32 = 5;

/// Largest canvas dimension the compositor will allocate.
const MAX_CANVAS_DIM: u32 = 16_384;

/// Largest caption size in pixels. Bigger requests are drawn at this size.
pub const MAX_CAPTION_FONT_SIZE: f32 = 72.0;

/// Errors while building a captioned image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositeError {
    #[error("source image has no pixels")]
    EmptyImage,

    #[error("captioned image would be {width}x{height} pixels")]
    TooLarge { width: u32, height: u32 },
}

/// Caption geometry for one layout mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Height of the header band added above the image
    pub extra_height: u32,
    /// Vertical offset at which the source image is pasted
    pub image_offset: u32,
    /// Captions longer than this many characters are truncated
    pub max_chars: usize,
    /// Top offset of the caption text
    pub text_top: u32,
    /// Caption pixel height when the batch does not set one
    pub default_font_size: f32,
}

impl CaptionStyle {
    /// Standard paper: roomy header for a 16px caption.
    pub const STANDARD: Self = Self {
        extra_height: 35,
        image_offset: 35,
        max_chars: 35,
        text_top: 8,
        default_font_size: 16.0,
    };

    /// Thermal labels: compact header for a 12px caption.
    pub const THERMAL: Self = Self {
        extra_height: 22,
        image_offset: 22,
        max_chars: 25,
        text_top: 3,
        default_font_size: 12.0,
    };

    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Standard => Self::STANDARD,
            LayoutMode::Thermal => Self::THERMAL,
        }
    }
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_caption(caption: &str, max_chars: usize) -> Cow<'_, str> {
    match caption.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &caption[..cut], ELLIPSIS)),
        None => Cow::Borrowed(caption),
    }
}

/// Overlays captions using a font resolved once at construction.
#[derive(Debug, Clone)]
pub struct CaptionCompositor {
    font: CaptionFont,
}

impl Default for CaptionCompositor {
    /// Bundled outline font.
    fn default() -> Self {
        Self::new(&font::default_sources())
    }
}

impl CaptionCompositor {
    /// Resolve the font from `sources`, falling back to the bitmap font.
    pub fn new(sources: &[Box<dyn FontSource>]) -> Self {
        Self {
            font: font::resolve(sources),
        }
    }

    /// Compositor using only the Spleen bitmap font.
    pub fn bitmap() -> Self {
        Self {
            font: CaptionFont::Bitmap,
        }
    }

    pub fn font(&self) -> &CaptionFont {
        &self.font
    }

    /// Add `caption` above `image`.
    ///
    /// Blank captions return a copy of the input. Any failure is logged and also
    /// returns the uncaptioned image.
    pub fn composite(
        &self,
        image: &RgbImage,
        caption: &str,
        mode: LayoutMode,
        font_size: Option<f32>,
    ) -> RgbImage {
        match self.try_composite(image, caption, mode, font_size) {
            Ok(captioned) => captioned,
            Err(e) => {
                warn!(caption, error = %e, "Caption compositing failed, keeping uncaptioned image");
                image.clone()
            }
        }
    }

    /// Fallible form of [`composite`](Self::composite).
    pub fn try_composite(
        &self,
        image: &RgbImage,
        caption: &str,
        mode: LayoutMode,
        font_size: Option<f32>,
    ) -> Result<RgbImage, CompositeError> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Ok(image.clone());
        }

        let style = CaptionStyle::for_mode(mode);
        let (width, height) = (image.width(), image.height() + style.extra_height);
        check_canvas(image, width, height)?;

        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        imageops::replace(&mut canvas, image, 0, style.image_offset as i64);

        let text = truncate_caption(caption, style.max_chars);
        let size = font_size.unwrap_or(style.default_font_size).min(MAX_CAPTION_FONT_SIZE);
        let text_x = centered_x(width, self.font.text_width(&text, size));
        self.font
            .draw_text(&mut canvas, &text, text_x, style.text_top as i64, size, BLACK);

        Ok(canvas)
    }

    /// Append `text` centred in a band below `image`.
    ///
    /// Used for matrix codes that have no item name but should still show their
    /// data in human-readable form.
    pub fn append_footer(&self, image: &RgbImage, text: &str, font_size: f32) -> RgbImage {
        let text = text.trim();
        if text.is_empty() {
            return image.clone();
        }

        let (width, height) = (image.width(), image.height() + FOOTER_HEIGHT);
        if let Err(e) = check_canvas(image, width, height) {
            warn!(text, error = %e, "Footer compositing failed, keeping image");
            return image.clone();
        }

        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        imageops::replace(&mut canvas, image, 0, 0);

        let font_size = font_size.min(MAX_CAPTION_FONT_SIZE);
        let text_x = centered_x(width, self.font.text_width(text, font_size));
        let text_y = (image.height() + FOOTER_GAP) as i64;
        self.font.draw_text(&mut canvas, text, text_x, text_y, font_size, BLACK);

        canvas
    }
}

fn check_canvas(image: &RgbImage, width: u32, height: u32) -> Result<(), CompositeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CompositeError::EmptyImage);
    }
    if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
        return Err(CompositeError::TooLarge { width, height });
    }
    Ok(())
}

/// Left edge that centres `text_width` in `width`, never negative.
fn centered_x(width: u32, text_width: u32) -> i64 {
    (width.saturating_sub(text_width) / 2) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gray(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([128, 128, 128]))
    }

    #[test]
    fn test_blank_caption_is_noop() {
        let img = gray(50, 20);
        let out = CaptionCompositor::bitmap().composite(&img, "   ", LayoutMode::Standard, None);
        assert_eq!(out, img);
    }

    #[test]
    fn test_standard_band_and_offset() {
        let img = gray(300, 100);
        let out = CaptionCompositor::bitmap().composite(&img, "Widget A", LayoutMode::Standard, None);
        assert_eq!(out.dimensions(), (300, 135));
        // Source pasted below the band, untouched
        assert_eq!(*out.get_pixel(0, 35), Rgb([128, 128, 128]));
        assert_eq!(*out.get_pixel(299, 134), Rgb([128, 128, 128]));
        // Caption ink somewhere in the band
        let inked = (0..35).any(|y| (0..300).any(|x| out.get_pixel(x, y).0 == [0, 0, 0]));
        assert!(inked);
        // Input unchanged
        assert_eq!(img, gray(300, 100));
    }

    #[test]
    fn test_default_compositor_inks_inside_band() {
        let compositor = CaptionCompositor::default();
        assert!(matches!(compositor.font(), CaptionFont::Outline(_)));

        let img = gray(300, 100);
        let out = compositor.composite(&img, "Widget A", LayoutMode::Standard, None);
        assert_eq!(out.dimensions(), (300, 135));
        let dark = |y: u32| (0..300).any(|x| out.get_pixel(x, y).0[0] < 100);
        assert!((0..35).any(dark));
        assert!(!dark(0));
        assert_eq!(*out.get_pixel(150, 35), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_thermal_band_is_smaller() {
        let img = gray(200, 60);
        let out = CaptionCompositor::bitmap().composite(&img, "Label", LayoutMode::Thermal, None);
        assert_eq!(out.height(), 82);
        assert_eq!(*out.get_pixel(0, 22), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_truncation_limits() {
        let long = "X".repeat(40);
        assert_eq!(truncate_caption(&long, 35), format!("{}...", "X".repeat(35)));
        assert_eq!(truncate_caption(&long, 25).chars().count(), 28);
        assert_eq!(truncate_caption("short", 25), "short");
        assert_eq!(truncate_caption(&"é".repeat(35), 35), "é".repeat(35));
        assert_eq!(truncate_caption(&"é".repeat(36), 35), format!("{}...", "é".repeat(35)));
    }

    #[test]
    fn test_caption_wider_than_image_is_left_clamped() {
        let img = gray(20, 20);
        let out = CaptionCompositor::bitmap().composite(
            &img,
            "a very long caption for a tiny image",
            LayoutMode::Standard,
            Some(24.0),
        );
        assert_eq!(out.width(), 20);
    }

    #[test]
    fn test_empty_image_fails_then_falls_back() {
        let img = RgbImage::new(0, 0);
        let compositor = CaptionCompositor::bitmap();
        assert_eq!(
            compositor.try_composite(&img, "x", LayoutMode::Standard, None),
            Err(CompositeError::EmptyImage)
        );
        assert_eq!(compositor.composite(&img, "x", LayoutMode::Standard, None), img);
    }

    #[test]
    fn test_oversized_caption_stays_in_band() {
        let img = gray(300, 100);
        let compositor = CaptionCompositor::bitmap();
        for size in [20_000.0, 1.0e9, f32::MAX] {
            let out = compositor.composite(&img, "Widget A", LayoutMode::Standard, Some(size));
            assert_eq!(out.dimensions(), (300, 135));
            assert_eq!(*out.get_pixel(0, 35), Rgb([128, 128, 128]));
        }
    }

    #[test]
    fn test_footer() {
        let img = gray(120, 120);
        let out = CaptionCompositor::bitmap().append_footer(&img, "12345", 12.0);
        assert_eq!(out.dimensions(), (120, 150));
        assert_eq!(*out.get_pixel(0, 0), Rgb([128, 128, 128]));
    }
}
