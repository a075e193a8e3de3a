//! Raster parameters for linear symbols.
//!
//! Symbols are rasterized at [`RASTER_DPI`]. Physical sizes are given in
//! millimetres and converted to whole pixels.
//!
//! | Parameter | Standard | Thermal |
//! |-----------|----------|---------|
//! | module width | 0.33 mm | 0.25 mm |
//! | bar height | 10 mm | 6 mm |
//! | quiet zone | 3 mm | 1.5 mm |
//! | text size | 8 pt | 6 pt |
//! | text gap | 3 mm | 1 mm |

use serde::{Deserialize, Serialize};

/// Raster resolution of rendered symbols.
pub const RASTER_DPI: f32 = 300.0;

/// Output stock the symbols are rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Multi-column sheets on standard paper
    #[default]
    Standard,
    /// One label per page on thermal stock
    Thermal,
}

/// Convert millimetres to raster pixels, at least one.
#[inline]
pub fn mm_to_px(mm: f32) -> u32 {
    (mm * RASTER_DPI / 25.4).round().max(1.0) as u32
}

/// Convert a point size to raster pixels.
#[inline]
pub fn pt_to_px(pt: f32) -> f32 {
    pt * RASTER_DPI / 72.0
}

/// Linear barcode geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub module_width_mm: f32,
    pub bar_height_mm: f32,
    pub quiet_zone_mm: f32,
    pub font_size_pt: f32,
    pub text_distance_mm: f32,
}

impl RenderParams {
    pub const STANDARD: Self = Self {
        module_width_mm: 0.33,
        bar_height_mm: 10.0,
        quiet_zone_mm: 3.0,
        font_size_pt: 8.0,
        text_distance_mm: 3.0,
    };

    pub const THERMAL: Self = Self {
        module_width_mm: 0.25,
        bar_height_mm: 6.0,
        quiet_zone_mm: 1.5,
        font_size_pt: 6.0,
        text_distance_mm: 1.0,
    };

    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Standard => Self::STANDARD,
            LayoutMode::Thermal => Self::THERMAL,
        }
    }

    #[inline]
    pub fn module_px(&self) -> u32 {
        mm_to_px(self.module_width_mm)
    }

    #[inline]
    pub fn bar_height_px(&self) -> u32 {
        mm_to_px(self.bar_height_mm)
    }

    #[inline]
    pub fn quiet_zone_px(&self) -> u32 {
        mm_to_px(self.quiet_zone_mm)
    }

    #[inline]
    pub fn text_gap_px(&self) -> u32 {
        mm_to_px(self.text_distance_mm)
    }

    #[inline]
    pub fn text_px(&self) -> f32 {
        pt_to_px(self.font_size_pt)
    }
}
