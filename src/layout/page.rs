//! Page sizes.
//!
//! | Page size | Dimensions | Mode |
//! |-----------|------------|------|
//! | A4 | 210 × 297 mm | grid |
//! | Letter | 215.9 × 279.4 mm | grid |
//! | A3 | 297 × 420 mm | grid |
//! | A5 | 148 × 210 mm | grid |
//! | Legal | 215.9 × 355.6 mm | grid |
//! | 50x25mm Label | 50 × 25 mm | thermal |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::symbol::LayoutMode;

/// Convert millimetres to PDF points.
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Output page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    A3,
    A5,
    Legal,
    /// 50x25mm thermal label stock
    #[serde(rename = "50x25mm Label", alias = "ThermalLabel")]
    ThermalLabel,
}

impl PageSize {
    pub const ALL: [PageSize; 6] = [
        PageSize::A4,
        PageSize::Letter,
        PageSize::A3,
        PageSize::A5,
        PageSize::Legal,
        PageSize::ThermalLabel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::A3 => "A3",
            PageSize::A5 => "A5",
            PageSize::Legal => "Legal",
            PageSize::ThermalLabel => "50x25mm Label",
        }
    }

    /// Portrait width and height in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::A3 => (297.0, 420.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Legal => (215.9, 355.6),
            PageSize::ThermalLabel => (50.0, 25.0),
        }
    }

    /// Width and height in points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w), mm_to_pt(h))
    }

    pub fn is_thermal(self) -> bool {
        self == PageSize::ThermalLabel
    }

    pub fn layout_mode(self) -> LayoutMode {
        if self.is_thermal() {
            LayoutMode::Thermal
        } else {
            LayoutMode::Standard
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageSize {
    type Err = String;

    /// Case-insensitive. The label stock also answers to `thermal`, `label` and `50x25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if matches!(wanted.as_str(), "thermal" | "label" | "50x25" | "thermallabel") {
            return Ok(PageSize::ThermalLabel);
        }
        PageSize::ALL
            .into_iter()
            .find(|size| size.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown page size '{s}'"))
    }
}
