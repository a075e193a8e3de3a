//! # Error Types
//!
//! Batch-level errors for the codesheet pipeline.
//!
//! Per-item problems (a code the encoder rejects, a caption that cannot be drawn,
//! an image the canvas refuses) never show up here: they are recovered where they
//! happen and reported as per-item outcomes. Only failures that abort a whole
//! batch are `CodesheetError`s.

use thiserror::Error;

use crate::assemble::AssemblyError;
use crate::parse::InputError;

/// Main error type for codesheet operations
#[derive(Debug, Error)]
pub enum CodesheetError {
    /// Input text was empty, had no usable lines, or exceeded the batch limit
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Batch configuration is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The output document could not be produced
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Cancelled through a [`CancelToken`](crate::pipeline::CancelToken)
    #[error("Batch cancelled")]
    Cancelled,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
