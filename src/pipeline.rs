//! # Batch Pipeline
//!
//! Glues the stages together:
//!
//! ```text
//! text ──→ parse ──→ validate ──→ render (rayon) ──→ plan ──→ assemble ──→ bytes
//!                                    │                          │
//!                               CancelToken               ProgressObserver
//! ```
//!
//! Rendering is the only parallel stage. `par_iter().map().collect()` keeps the
//! input order, so symbol `i`, placement `i` and entry `i` always describe the
//! same code.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assemble::{self, AssemblyError, DrawOutcome, PageCanvas, PdfCanvas};
use crate::caption::MAX_CAPTION_FONT_SIZE;
use crate::caption::font::FontSource;
use crate::error::CodesheetError;
use crate::layout::{self, LayoutConfig, PageSize, Placement};
use crate::parse::{self, CodeEntry};
use crate::symbol::{RenderOptions, RenderedSymbol, SymbolOutcome, SymbolRenderer};
use crate::symbology::Symbology;

/// Title written into generated PDFs.
const DOCUMENT_TITLE: &str = "Barcode Sheet";

/// Everything a batch needs besides its text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub symbology: Symbology,
    pub page_size: PageSize,
    pub columns_per_row: Option<u32>,
    pub symbol_width_mm: Option<f32>,
    pub symbol_height_mm: Option<f32>,
    /// Caption size, used both for the rendered item name and the layout reserve
    pub caption_font_size_pt: Option<f32>,
    pub include_caption: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128,
            page_size: PageSize::A4,
            columns_per_row: None,
            symbol_width_mm: None,
            symbol_height_mm: None,
            caption_font_size_pt: None,
            include_caption: true,
        }
    }
}

impl BatchConfig {
    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            page_size: self.page_size,
            columns_per_row: self.columns_per_row,
            symbol_width_mm: self.symbol_width_mm,
            symbol_height_mm: self.symbol_height_mm,
            caption_font_size_pt: self.caption_font_size_pt,
            include_caption: self.include_caption,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            symbology: self.symbology,
            include_caption: self.include_caption,
            mode: self.page_size.layout_mode(),
            caption_font_size: self.caption_font_size_pt,
        }
    }

    /// Reject zero columns, non-positive or non-finite sizes, and captions
    /// larger than [`MAX_CAPTION_FONT_SIZE`].
    pub fn validate(&self) -> Result<(), CodesheetError> {
        if self.columns_per_row == Some(0) {
            return Err(CodesheetError::Config("columns_per_row must be at least 1".into()));
        }

        let sizes = [
            ("symbol_width_mm", self.symbol_width_mm),
            ("symbol_height_mm", self.symbol_height_mm),
            ("caption_font_size_pt", self.caption_font_size_pt),
        ];
        for (name, value) in sizes {
            match value {
                Some(v) if !(v.is_finite() && v > 0.0) => {
                    return Err(CodesheetError::Config(format!(
                        "{name} must be positive, got {v}"
                    )));
                }
                _ => {}
            }
        }

        match self.caption_font_size_pt {
            Some(size) if size > MAX_CAPTION_FONT_SIZE => Err(CodesheetError::Config(format!(
                "caption_font_size_pt must be at most {MAX_CAPTION_FONT_SIZE}, got {size}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Assemble,
}

/// Receives `(stage, done, total)` as items finish.
///
/// Render-stage calls come from rayon worker threads, one at a time. `done` counts
/// up by one per call within each stage.
pub trait ProgressObserver: Sync {
    fn on_progress(&self, stage: Stage, done: usize, total: usize);
}

/// Observer that ignores everything.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _stage: Stage, _done: usize, _total: usize) {}
}

/// Parse `text` and enforce the batch size limit.
pub fn validate_batch(text: &str) -> Result<Vec<CodeEntry>, CodesheetError> {
    let entries = parse::parse(text)?;
    parse::check_batch_size(&entries)?;
    Ok(entries)
}

/// Result of one batch.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub document: Vec<u8>,
    pub entries: Vec<CodeEntry>,
    pub symbol_outcomes: Vec<SymbolOutcome>,
    pub draw_outcomes: Vec<DrawOutcome>,
    pub placements: Vec<Placement>,
    pub page_count: usize,
}

impl BatchOutput {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placeholder_count(&self) -> usize {
        self.symbol_outcomes.iter().filter(|o| o.is_placeholder()).count()
    }

    pub fn fallback_count(&self) -> usize {
        self.draw_outcomes
            .iter()
            .filter(|o| matches!(o, DrawOutcome::Fallback(_)))
            .count()
    }
}

/// Runs batches with a shared renderer.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    renderer: SymbolRenderer,
}

impl Generator {
    pub fn new(renderer: SymbolRenderer) -> Self {
        Self { renderer }
    }

    /// Generator whose caption font comes from `sources`, falling back to the built-in font.
    pub fn with_fonts(sources: &[Box<dyn FontSource>]) -> Self {
        Self::new(SymbolRenderer::with_fonts(sources))
    }

    /// Generate a PDF without cancellation or progress reporting.
    pub fn generate(&self, text: &str, config: &BatchConfig) -> Result<BatchOutput, CodesheetError> {
        self.generate_with(text, config, &CancelToken::new(), &NoProgress)
    }

    pub fn generate_with(
        &self,
        text: &str,
        config: &BatchConfig,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<BatchOutput, CodesheetError> {
        let canvas = PdfCanvas::new(config.page_size, DOCUMENT_TITLE);
        self.generate_into(canvas, text, config, cancel, progress)
    }

    /// Run the full pipeline against any canvas.
    pub fn generate_into<C: PageCanvas>(
        &self,
        mut canvas: C,
        text: &str,
        config: &BatchConfig,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<BatchOutput, CodesheetError> {
        config.validate()?;
        let entries = validate_batch(text)?;
        info!(
            entries = entries.len(),
            symbology = %config.symbology,
            page_size = %config.page_size,
            "Generating batch"
        );
        if config.symbology == Symbology::DataMatrix {
            warn!(
                entries = entries.len(),
                "DataMatrix requested; rendering QR codes in its place"
            );
        }

        let symbols = self.render_all(&entries, &config.render_options(), cancel, progress)?;
        let placements = layout::plan(&symbols, &config.layout());
        debug!(placements = placements.len(), "Layout planned");

        if cancel.is_cancelled() {
            return Err(CodesheetError::Cancelled);
        }

        let total = symbols.len();
        let (page_count, draw_outcomes) =
            assemble::assemble_with(&mut canvas, &placements, &symbols, |done| {
                progress.on_progress(Stage::Assemble, done, total)
            })?;
        let document = canvas.finish().map_err(AssemblyError::from)?;

        let output = BatchOutput {
            document,
            entries,
            symbol_outcomes: symbols.into_iter().map(|s| s.outcome).collect(),
            draw_outcomes,
            placements,
            page_count,
        };
        info!(
            items = output.len(),
            pages = output.page_count,
            placeholders = output.placeholder_count(),
            fallbacks = output.fallback_count(),
            bytes = output.document.len(),
            "Batch complete"
        );
        Ok(output)
    }

    /// Render every entry in parallel, preserving order.
    ///
    /// The cancel flag is checked before each entry; any cancelled entry fails the batch.
    pub fn render_all(
        &self,
        entries: &[CodeEntry],
        options: &RenderOptions,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Vec<RenderedSymbol>, CodesheetError> {
        let total = entries.len();
        // Held across the callback so counts reach the observer in order
        let done = Mutex::new(0usize);

        let symbols = entries
            .par_iter()
            .map(|entry| {
                if cancel.is_cancelled() {
                    return Err(CodesheetError::Cancelled);
                }
                let symbol = self.renderer.render(entry, options);
                let mut finished = done.lock().unwrap_or_else(PoisonError::into_inner);
                *finished += 1;
                progress.on_progress(Stage::Render, *finished, total);
                drop(finished);
                Ok(symbol)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rendered = symbols.len(), "Render stage complete");
        Ok(symbols)
    }
}
