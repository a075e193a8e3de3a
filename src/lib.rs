//! # Codesheet - Bulk Barcode Sheet Generator
//!
//! Codesheet turns a pasted list of items and codes into a printable PDF of
//! machine-readable symbols. It provides:
//!
//! - **Tolerant parsing**: comma, tab, pipe or whitespace separated lines, deduplicated
//! - **Symbol rendering**: linear barcodes, QR-backed DataMatrix and PDF417
//! - **Captions**: item names composited above each symbol
//! - **Layout**: a multi-column grid for sheet paper, one label per page for thermal stock
//!
//! ## Quick Start
//!
//! ```no_run
//! use codesheet::{BatchConfig, Generator, PageSize, Symbology};
//!
//! let config = BatchConfig {
//!     symbology: Symbology::Code128,
//!     page_size: PageSize::A4,
//!     ..Default::default()
//! };
//!
//! let output = Generator::default().generate("Widget A,12345\nWidget B,67890", &config)?;
//! std::fs::write("sheet.pdf", &output.document)?;
//!
//! # Ok::<(), codesheet::CodesheetError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`parse`] | Text and CSV rows to [`CodeEntry`] lists |
//! | [`symbol`] | Code to raster image, with error placeholders |
//! | [`caption`] | Item-name captions and font resolution |
//! | [`layout`] | Page sizes, grid and thermal placement |
//! | [`assemble`] | Placements to document bytes via [`PageCanvas`] |
//! | [`pipeline`] | Batch orchestration, cancellation, progress |
//! | [`error`] | Error types |

pub mod assemble;
pub mod caption;
pub mod error;
pub mod layout;
pub mod parse;
pub mod pipeline;
pub mod symbol;
pub mod symbology;

// Re-exports for convenience
pub use assemble::{PageCanvas, PdfCanvas};
pub use error::CodesheetError;
pub use layout::{LayoutConfig, PageSize, Placement};
pub use parse::{CodeEntry, InputError, Preview, parse, preview};
pub use pipeline::{BatchConfig, BatchOutput, CancelToken, Generator, ProgressObserver, Stage};
pub use symbol::{RenderOptions, RenderedSymbol, SymbolOutcome, SymbolRenderer};
pub use symbology::Symbology;
