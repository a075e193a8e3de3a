//! # Document Assembler
//!
//! Walks placements and symbols in order and drives a [`PageCanvas`]:
//!
//! - a new page starts whenever `page_index` advances
//! - each image is fitted inside its placement box, aspect ratio preserved and centred
//! - if the canvas refuses one image, a red fallback rectangle labelled with the
//!   code is drawn in its place and the batch carries on
//!
//! Only sink failures (the canvas itself cannot produce output) abort assembly.

mod pdf;

pub use pdf::PdfCanvas;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::Placement;
use crate::symbol::RenderedSymbol;

/// A single image could not be drawn. Recovered per item.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}

/// The canvas itself failed. Fatal to the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("drawing before the first page was started")]
    NoPage,

    #[error("document sink failed: {0}")]
    Failed(String),
}

/// Errors that abort assembly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("{placements} placements for {symbols} symbols")]
    LengthMismatch { placements: usize, symbols: usize },

    #[error("page index went back from {previous} to {next}")]
    PageOrder { previous: usize, next: usize },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Rectangle in page space (points, origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<&Placement> for Rect {
    fn from(p: &Placement) -> Self {
        Rect {
            x: p.x,
            y: p.y,
            width: p.draw_width,
            height: p.draw_height,
        }
    }
}

/// Largest rectangle with the image's aspect ratio that fits `rect`, centred in it.
pub fn fit_within(image_width: u32, image_height: u32, rect: Rect) -> Rect {
    if image_width == 0 || image_height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return rect;
    }

    let scale = (rect.width / image_width as f32).min(rect.height / image_height as f32);
    let (width, height) = (image_width as f32 * scale, image_height as f32 * scale);

    Rect {
        x: rect.x + (rect.width - width) / 2.0,
        y: rect.y + (rect.height - height) / 2.0,
        width,
        height,
    }
}

/// A paginated drawing surface.
pub trait PageCanvas {
    /// Start a new page; subsequent draws land on it.
    fn begin_page(&mut self) -> Result<(), SinkError>;

    /// Draw `image` stretched to exactly `rect`.
    fn draw_image(&mut self, image: &RgbImage, rect: Rect) -> Result<(), DrawError>;

    /// Draw a bordered rectangle with `label` inside.
    fn draw_fallback(&mut self, rect: Rect, label: &str) -> Result<(), SinkError>;

    /// Close the document and return its bytes.
    fn finish(self) -> Result<Vec<u8>, SinkError>;
}

/// What ended up on the page for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// The image was refused; a fallback rectangle was drawn instead
    Fallback(String),
}

/// Finished document plus per-item draw results.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub outcomes: Vec<DrawOutcome>,
}

/// Draw every symbol at its placement.
pub fn assemble<C: PageCanvas>(
    mut canvas: C,
    placements: &[Placement],
    symbols: &[RenderedSymbol],
) -> Result<Assembled, AssemblyError> {
    assemble_with(&mut canvas, placements, symbols, |_| {}).and_then(|(page_count, outcomes)| {
        Ok(Assembled {
            bytes: canvas.finish()?,
            page_count,
            outcomes,
        })
    })
}

/// Assembly loop; `on_item` is called after each item is drawn.
pub(crate) fn assemble_with<C: PageCanvas>(
    canvas: &mut C,
    placements: &[Placement],
    symbols: &[RenderedSymbol],
    mut on_item: impl FnMut(usize),
) -> Result<(usize, Vec<DrawOutcome>), AssemblyError> {
    if placements.len() != symbols.len() {
        return Err(AssemblyError::LengthMismatch {
            placements: placements.len(),
            symbols: symbols.len(),
        });
    }

    let mut current_page: Option<usize> = None;
    let mut page_count = 0;
    let mut outcomes = Vec::with_capacity(symbols.len());

    for (i, (placement, symbol)) in placements.iter().zip(symbols).enumerate() {
        match current_page {
            Some(page) if placement.page_index < page => {
                return Err(AssemblyError::PageOrder {
                    previous: page,
                    next: placement.page_index,
                });
            }
            Some(page) if placement.page_index == page => {}
            _ => {
                canvas.begin_page()?;
                page_count += 1;
                current_page = Some(placement.page_index);
            }
        }

        let rect = fit_within(symbol.width_px(), symbol.height_px(), Rect::from(placement));
        let outcome = match canvas.draw_image(&symbol.image, rect) {
            Ok(()) => DrawOutcome::Drawn,
            Err(e) => {
                warn!(code = %symbol.code, error = %e, "Image draw failed, drawing fallback box");
                canvas.draw_fallback(Rect::from(placement), &format!("Error: {}", symbol.code))?;
                DrawOutcome::Fallback(e.to_string())
            }
        };
        outcomes.push(outcome);
        on_item(i + 1);
    }

    debug!(page_count, items = outcomes.len(), "Assembly complete");
    Ok((page_count, outcomes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, PageSize, plan};
    use crate::symbol::SymbolOutcome;
    use image::Rgb;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Page,
        Image(Rect),
        Fallback(Rect, String),
    }

    /// Records calls; refuses images whose width is listed in `refuse_widths`.
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub calls: Vec<Call>,
        pub refuse_widths: Vec<u32>,
        pub fail_finish: bool,
    }

    impl PageCanvas for RecordingCanvas {
        fn begin_page(&mut self) -> Result<(), SinkError> {
            self.calls.push(Call::Page);
            Ok(())
        }

        fn draw_image(&mut self, image: &RgbImage, rect: Rect) -> Result<(), DrawError> {
            if self.refuse_widths.contains(&image.width()) {
                return Err(DrawError::UnsupportedImage("refused".into()));
            }
            self.calls.push(Call::Image(rect));
            Ok(())
        }

        fn draw_fallback(&mut self, rect: Rect, label: &str) -> Result<(), SinkError> {
            self.calls.push(Call::Fallback(rect, label.to_string()));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, SinkError> {
            if self.fail_finish {
                return Err(SinkError::Failed("disk full".into()));
            }
            Ok(format!("{} calls", self.calls.len()).into_bytes())
        }
    }

    fn symbol(code: &str, width: u32, height: u32) -> RenderedSymbol {
        RenderedSymbol {
            item_name: String::new(),
            code: code.to_string(),
            image: RgbImage::from_pixel(width, height, Rgb([0, 0, 0])),
            outcome: SymbolOutcome::Rendered,
        }
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        let rect = Rect { x: 10.0, y: 20.0, width: 100.0, height: 50.0 };
        let fitted = fit_within(400, 100, rect);
        assert_eq!(fitted.width, 100.0);
        assert_eq!(fitted.height, 25.0);
        assert_eq!(fitted.x, 10.0);
        assert_eq!(fitted.y, 32.5);

        let fitted = fit_within(100, 100, rect);
        assert_eq!((fitted.width, fitted.height), (50.0, 50.0));
        assert_eq!(fitted.x, 35.0);
    }

    #[test]
    fn test_new_page_on_page_advance() {
        let config = LayoutConfig {
            page_size: PageSize::ThermalLabel,
            ..Default::default()
        };
        let symbols: Vec<_> = (0..3).map(|i| symbol(&i.to_string(), 100, 50)).collect();
        let placements = plan(&symbols, &config);

        let mut canvas = RecordingCanvas::default();
        let (pages, outcomes) = assemble_with(&mut canvas, &placements, &symbols, |_| {}).unwrap();
        assert_eq!(pages, 3);
        assert_eq!(outcomes, vec![DrawOutcome::Drawn; 3]);
        let page_calls = canvas.calls.iter().filter(|c| **c == Call::Page).count();
        assert_eq!(page_calls, 3);
        assert_eq!(canvas.calls[0], Call::Page);
    }

    #[test]
    fn test_grid_items_share_page() {
        let symbols: Vec<_> = (0..4).map(|i| symbol(&i.to_string(), 100, 50)).collect();
        let placements = plan(&symbols, &LayoutConfig::default());
        let assembled = assemble(RecordingCanvas::default(), &placements, &symbols).unwrap();
        assert_eq!(assembled.page_count, 1);
        assert_eq!(assembled.bytes, b"5 calls".to_vec());
        assert_eq!(assembled.outcomes, vec![DrawOutcome::Drawn; 4]);
    }

    #[test]
    fn test_draw_failure_is_isolated() {
        let symbols = vec![symbol("A", 100, 50), symbol("B", 7, 50), symbol("C", 100, 50)];
        let placements = plan(&symbols, &LayoutConfig::default());
        let mut canvas = RecordingCanvas {
            refuse_widths: vec![7],
            ..Default::default()
        };

        let (_, outcomes) = assemble_with(&mut canvas, &placements, &symbols, |_| {}).unwrap();
        assert_eq!(outcomes[0], DrawOutcome::Drawn);
        assert!(matches!(outcomes[1], DrawOutcome::Fallback(_)));
        assert_eq!(outcomes[2], DrawOutcome::Drawn);
        assert!(canvas.calls.contains(&Call::Fallback(Rect::from(&placements[1]), "Error: B".into())));
    }

    #[test]
    fn test_length_mismatch_and_sink_failure() {
        let symbols = vec![symbol("A", 10, 10)];
        assert_eq!(
            assemble(RecordingCanvas::default(), &[], &symbols).unwrap_err(),
            AssemblyError::LengthMismatch { placements: 0, symbols: 1 }
        );

        let placements = plan(&symbols, &LayoutConfig::default());
        let canvas = RecordingCanvas {
            fail_finish: true,
            ..Default::default()
        };
        assert!(matches!(
            assemble(canvas, &placements, &symbols),
            Err(AssemblyError::Sink(SinkError::Failed(_)))
        ));
    }

    #[test]
    fn test_page_order_violation() {
        let symbols = vec![symbol("A", 10, 10), symbol("B", 10, 10)];
        let mut placements = plan(&symbols, &LayoutConfig::default());
        placements[0].page_index = 1;
        assert_eq!(
            assemble(RecordingCanvas::default(), &placements, &symbols).unwrap_err(),
            AssemblyError::PageOrder { previous: 1, next: 0 }
        );
    }
}
