//! # Codesheet CLI
//!
//! Command-line interface for bulk barcode sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Grid of Code128 symbols on A4 from a text file
//! codesheet generate --input items.txt --output sheet.pdf
//!
//! # Thermal labels from a CSV upload, one per page
//! codesheet generate --input items.csv --page-size "50x25mm Label" --symbology EAN13
//!
//! # Settings from a JSON file, with flags taking precedence
//! codesheet generate --config batch.json --columns 4 < items.txt
//!
//! # Check what a list would produce
//! codesheet preview --input items.txt
//!
//! # Write the sample CSV template
//! codesheet template --output template.csv
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use codesheet::{
    BatchConfig, CodesheetError, Generator, PageSize, Symbology,
    caption::font::{FontFile, FontSource, default_sources},
    parse::{self, flatten_csv, template_csv},
};

/// Codesheet - bulk barcode sheet and label generator
#[derive(Parser, Debug)]
#[command(name = "codesheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a list of items and codes to a PDF
    Generate {
        /// Input file (`.csv` is read as item/code rows); stdin when omitted
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output PDF path
        #[arg(long, short, value_name = "FILE", default_value = "codes.pdf")]
        output: PathBuf,

        /// JSON batch configuration; flags override its fields
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Code standard (Code128, Code39, EAN13, EAN8, UPC-A, ITF, DataMatrix, PDF417)
        #[arg(long)]
        symbology: Option<Symbology>,

        /// Page size (A4, Letter, A3, A5, Legal, "50x25mm Label")
        #[arg(long)]
        page_size: Option<PageSize>,

        /// Grid columns per row
        #[arg(long)]
        columns: Option<u32>,

        /// Symbol width in millimetres
        #[arg(long)]
        width_mm: Option<f32>,

        /// Symbol height in millimetres
        #[arg(long)]
        height_mm: Option<f32>,

        /// Caption font size
        #[arg(long)]
        font_size: Option<f32>,

        /// Leave out item names and human-readable code text
        #[arg(long)]
        no_caption: bool,

        /// TrueType/OpenType font for captions, tried in order before the bundled font (repeatable)
        #[arg(long, value_name = "FILE")]
        font: Vec<PathBuf>,
    },

    /// Show the first entries a list would produce
    Preview {
        /// Input file; stdin when omitted
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the sample CSV upload template
    Template {
        /// Output path; stdout when omitted
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CodesheetError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            symbology,
            page_size,
            columns,
            width_mm,
            height_mm,
            font_size,
            no_caption,
            font,
        } => {
            let mut batch = match config {
                Some(path) => load_config(&path)?,
                None => BatchConfig::default(),
            };
            if let Some(symbology) = symbology {
                batch.symbology = symbology;
            }
            if let Some(page_size) = page_size {
                batch.page_size = page_size;
            }
            batch.columns_per_row = columns.or(batch.columns_per_row);
            batch.symbol_width_mm = width_mm.or(batch.symbol_width_mm);
            batch.symbol_height_mm = height_mm.or(batch.symbol_height_mm);
            batch.caption_font_size_pt = font_size.or(batch.caption_font_size_pt);
            if no_caption {
                batch.include_caption = false;
            }

            let fonts: Vec<Box<dyn FontSource>> = font
                .into_iter()
                .map(|path| Box::new(FontFile(path)) as Box<dyn FontSource>)
                .chain(default_sources())
                .collect();

            let text = read_input(input.as_deref())?;
            let result = Generator::with_fonts(&fonts).generate(&text, &batch)?;
            std::fs::write(&output, &result.document)?;

            println!(
                "Wrote {} codes on {} page(s) to {}",
                result.len(),
                result.page_count,
                output.display()
            );
            let placeholders = result.placeholder_count();
            if placeholders > 0 {
                println!("{} code(s) could not be encoded as {}", placeholders, batch.symbology);
            }
        }

        Commands::Preview { input, json } => {
            let text = read_input(input.as_deref())?;
            let preview = parse::preview(&text);

            if json {
                let rendered = serde_json::to_string_pretty(&preview)
                    .map_err(|e| CodesheetError::Config(e.to_string()))?;
                println!("{}", rendered);
            } else {
                for line in &preview.codes {
                    println!("  {}", line);
                }
                if preview.has_more {
                    println!("  ... and {} more", preview.total_count - preview.codes.len());
                }
                println!("{} code(s) total", preview.total_count);
            }
        }

        Commands::Template { output } => {
            let csv = template_csv();
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Saved to {}", path.display());
                }
                None => print!("{}", csv),
            }
        }
    }

    Ok(())
}

/// Load a JSON batch configuration.
fn load_config(path: &Path) -> Result<BatchConfig, CodesheetError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| CodesheetError::Config(format!("{}: {}", path.display(), e)))
}

/// Read the input text; CSV files are flattened to `item,code` lines first.
fn read_input(path: Option<&Path>) -> Result<String, CodesheetError> {
    let Some(path) = path else {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    };

    let raw = std::fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(flatten_csv(&raw))
    } else {
        Ok(raw)
    }
}
