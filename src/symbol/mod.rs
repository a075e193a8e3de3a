//! # Symbol Renderer
//!
//! Turns one [`CodeEntry`] into one RGB raster image.
//!
//! ## Pipeline
//!
//! ```text
//! CodeEntry ─┬─ linear (Code128, Code39, EAN13, EAN8, UPC-A, ITF)
//!            │     barcoders → modules → bars + optional code text
//!            │
//!            └─ matrix (DataMatrix, PDF417)
//!                  qrcode / pdf417 → cells
//!                                     │
//!                    item name? ──────┴──→ CaptionCompositor
//! ```
//!
//! Rendering never fails: a code the encoder rejects becomes a 200x100
//! [`placeholder`] and the entry is marked [`SymbolOutcome::Placeholder`].

pub mod linear;
pub mod matrix;
mod params;
mod placeholder;

pub use params::{LayoutMode, RASTER_DPI, RenderParams, mm_to_px, pt_to_px};
pub use placeholder::{PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, placeholder};

use image::RgbImage;
use thiserror::Error;
use tracing::warn;

use crate::caption::CaptionCompositor;
use crate::caption::font::FontSource;
use crate::parse::CodeEntry;
use crate::symbology::Symbology;

/// Pixel height of the code text appended under matrix symbols.
const MATRIX_FOOTER_PX: f32 = 16.0;

/// Why an encoder refused a code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{symbology} cannot encode {code:?}: {reason}")]
    Rejected {
        symbology: Symbology,
        code: String,
        reason: String,
    },

    #[error("{0} is not a linear symbology")]
    NotLinear(Symbology),

    #[error("{0} is not a matrix symbology")]
    NotMatrix(Symbology),
}

/// Per-batch rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub symbology: Symbology,
    /// Show human-readable text (code line under linear bars, footer on matrix codes)
    pub include_caption: bool,
    pub mode: LayoutMode,
    /// Item-name caption size; the mode default when `None`
    pub caption_font_size: Option<f32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128,
            include_caption: true,
            mode: LayoutMode::Standard,
            caption_font_size: None,
        }
    }
}

/// How an entry's image came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Rendered,
    /// The encoder refused the code; the image is the error placeholder
    Placeholder(String),
}

impl SymbolOutcome {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, SymbolOutcome::Placeholder(_))
    }
}

/// A rendered entry, ready for layout.
#[derive(Debug, Clone)]
pub struct RenderedSymbol {
    pub item_name: String,
    pub code: String,
    pub image: RgbImage,
    pub outcome: SymbolOutcome,
}

impl RenderedSymbol {
    #[inline]
    pub fn width_px(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height_px(&self) -> u32 {
        self.image.height()
    }
}

/// Renders entries with a shared caption compositor.
#[derive(Debug, Clone, Default)]
pub struct SymbolRenderer {
    compositor: CaptionCompositor,
}

impl SymbolRenderer {
    pub fn new(compositor: CaptionCompositor) -> Self {
        Self { compositor }
    }

    /// Renderer whose caption font is resolved from `sources`.
    pub fn with_fonts(sources: &[Box<dyn FontSource>]) -> Self {
        Self::new(CaptionCompositor::new(sources))
    }

    pub fn compositor(&self) -> &CaptionCompositor {
        &self.compositor
    }

    /// Render one entry. Never fails.
    pub fn render(&self, entry: &CodeEntry, options: &RenderOptions) -> RenderedSymbol {
        let (image, outcome) = match self.encode(entry, options) {
            Ok(image) => (image, SymbolOutcome::Rendered),
            Err(e) => {
                warn!(code = %entry.code, error = %e, "Encoding failed, using placeholder");
                (placeholder(&entry.code), SymbolOutcome::Placeholder(e.to_string()))
            }
        };

        RenderedSymbol {
            item_name: entry.item_name.clone(),
            code: entry.code.clone(),
            image,
            outcome,
        }
    }

    fn encode(&self, entry: &CodeEntry, options: &RenderOptions) -> Result<RgbImage, EncodeError> {
        let symbol = if options.symbology.is_linear() {
            let modules = linear::encode(options.symbology, &entry.code)?;
            let params = RenderParams::for_mode(options.mode);
            let human_text = options.include_caption.then_some(entry.code.as_str());
            linear::rasterize(&modules, &params, human_text, self.compositor.font())
        } else {
            let symbol = matrix::render(options.symbology, &entry.code)?;
            if !entry.has_item_name() && options.include_caption {
                return Ok(self
                    .compositor
                    .append_footer(&symbol, &entry.code, MATRIX_FOOTER_PX));
            }
            symbol
        };

        Ok(self.compositor.composite(
            &symbol,
            &entry.item_name,
            options.mode,
            options.caption_font_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(symbology: Symbology) -> RenderOptions {
        RenderOptions {
            symbology,
            ..Default::default()
        }
    }

    #[test]
    fn test_every_symbology_yields_an_image() {
        let renderer = SymbolRenderer::default();
        let samples = [
            (Symbology::Code128, "Widget-001"),
            (Symbology::Code39, "WIDGET1"),
            (Symbology::Ean13, "590123412345"),
            (Symbology::Ean8, "9638507"),
            (Symbology::UpcA, "03600029145"),
            (Symbology::Itf, "12345678"),
            (Symbology::DataMatrix, "WIDGET-001"),
            (Symbology::Pdf417, "WIDGET-001"),
        ];
        for (symbology, code) in samples {
            let out = renderer.render(&CodeEntry::new("Widget", code), &options(symbology));
            assert_eq!(out.outcome, SymbolOutcome::Rendered, "{symbology}");
            assert!(out.width_px() > 0 && out.height_px() > 0);
        }
    }

    #[test]
    fn test_invalid_code_becomes_placeholder() {
        let out = SymbolRenderer::default()
            .render(&CodeEntry::new("Widget", "not-digits"), &options(Symbology::Ean13));
        assert!(out.outcome.is_placeholder());
        assert_eq!(out.image.dimensions(), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
        assert_eq!(out.code, "not-digits");
    }

    #[test]
    fn test_item_name_adds_caption_band() {
        let renderer = SymbolRenderer::default();
        let opts = options(Symbology::Code128);
        let bare = renderer.render(&CodeEntry::new("", "12345"), &opts);
        let named = renderer.render(&CodeEntry::new("Widget A", "12345"), &opts);
        assert_eq!(named.height_px(), bare.height_px() + 35);
        assert_eq!(named.width_px(), bare.width_px());
    }

    #[test]
    fn test_thermal_symbols_are_smaller() {
        let renderer = SymbolRenderer::default();
        let entry = CodeEntry::new("Item1", "111111");
        let standard = renderer.render(&entry, &options(Symbology::Code128));
        let thermal = renderer.render(
            &entry,
            &RenderOptions {
                mode: LayoutMode::Thermal,
                ..options(Symbology::Code128)
            },
        );
        assert!(thermal.width_px() < standard.width_px());
        assert!(thermal.height_px() < standard.height_px());
    }

    #[test]
    fn test_matrix_footer_only_without_item_name() {
        let renderer = SymbolRenderer::default();
        let opts = options(Symbology::DataMatrix);
        let qr = matrix::render_qr("12345").unwrap();

        let footed = renderer.render(&CodeEntry::new("", "12345"), &opts);
        assert_eq!(footed.height_px(), qr.height() + 30);

        let plain = renderer.render(
            &CodeEntry::new("", "12345"),
            &RenderOptions {
                include_caption: false,
                ..opts
            },
        );
        assert_eq!(plain.image, qr);

        let captioned = renderer.render(&CodeEntry::new("Widget", "12345"), &opts);
        assert_eq!(captioned.height_px(), qr.height() + 35);
    }
}
