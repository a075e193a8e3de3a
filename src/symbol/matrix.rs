//! Two-dimensional symbol rendering.
//!
//! - **DataMatrix** is drawn with a QR encoder (error correction L, 10px cells,
//!   4-cell border). No DataMatrix encoder is wired in, so the selection is
//!   honoured with a QR substitute. The batch pipeline logs the substitution.
//! - **PDF417** uses the `pdf417` encoder with a fixed 6-column, 24-row grid.

use image::{Rgb, RgbImage};
use pdf417::{END_PATTERN, PDF417, PDF417Encoder, START_PATTERN};
use qrcode::{EcLevel, QrCode};

use super::EncodeError;
use crate::symbology::Symbology;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// QR cell size in pixels.
const QR_CELL_PX: u32 = 10;
/// QR quiet border in cells.
const QR_BORDER_CELLS: u32 = 4;

const PDF417_COLS: u8 = 6;
const PDF417_ROWS: u8 = 24;
/// Modules per row: start, left indicator, data columns, right indicator, end.
const PDF417_ROW_MODULES: usize = START_PATTERN.size() as usize
    + 17
    + PDF417_COLS as usize * 17
    + 17
    + END_PATTERN.size() as usize;
/// Module width in pixels; rows are three modules tall.
const PDF417_MODULE_PX: u32 = 3;
const PDF417_ROW_PX: u32 = PDF417_MODULE_PX * 3;
/// Quiet border in modules.
const PDF417_BORDER_MODULES: u32 = 2;
/// Longest text accepted for the fixed grid, at worst one codeword per char.
const PDF417_MAX_CHARS: usize = 100;

/// Render a matrix symbology.
pub fn render(symbology: Symbology, code: &str) -> Result<RgbImage, EncodeError> {
    match symbology {
        Symbology::DataMatrix => {
            render_qr(code).map_err(|reason| EncodeError::Rejected {
                symbology,
                code: code.to_string(),
                reason,
            })
        }
        Symbology::Pdf417 => render_pdf417(code),
        other => Err(EncodeError::NotMatrix(other)),
    }
}

/// QR code at error correction level L.
pub fn render_qr(data: &str) -> Result<RgbImage, String> {
    let code = QrCode::with_error_correction_level(data, EcLevel::L)
        .map_err(|e| format!("QR code generation failed: {}", e))?;

    let modules = code.width() as u32;
    let size = (modules + 2 * QR_BORDER_CELLS) * QR_CELL_PX;
    let mut img = RgbImage::from_pixel(size, size, WHITE);

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            let x0 = (qx + QR_BORDER_CELLS) * QR_CELL_PX;
            let y0 = (qy + QR_BORDER_CELLS) * QR_CELL_PX;
            for y in y0..y0 + QR_CELL_PX {
                for x in x0..x0 + QR_CELL_PX {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
    }

    Ok(img)
}

fn render_pdf417(data: &str) -> Result<RgbImage, EncodeError> {
    let rejected = |reason: &str| EncodeError::Rejected {
        symbology: Symbology::Pdf417,
        code: data.to_string(),
        reason: reason.to_string(),
    };

    if !data.chars().all(|c| matches!(c, ' '..='~')) {
        return Err(rejected("PDF417 text compaction needs printable ASCII"));
    }
    if data.len() > PDF417_MAX_CHARS {
        return Err(rejected("data does not fit a 6x24 PDF417 symbol"));
    }

    let mut codewords = [0u16; PDF417_ROWS as usize * PDF417_COLS as usize];
    let (level, filled) = PDF417Encoder::new(&mut codewords, false)
        .append_ascii(data)
        .fit_seal()
        .ok_or_else(|| rejected("data does not fit a 6x24 PDF417 symbol"))?;

    let barcode = PDF417::new(filled, PDF417_ROWS, PDF417_COLS, level);
    let row_modules = PDF417_ROW_MODULES;
    let border = PDF417_BORDER_MODULES * PDF417_MODULE_PX;
    let width = row_modules as u32 * PDF417_MODULE_PX + 2 * border;
    let height = PDF417_ROWS as u32 * PDF417_ROW_PX + 2 * border;
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    for (i, dark) in barcode.bits().enumerate() {
        if !dark {
            continue;
        }
        let (row, col) = ((i / row_modules) as u32, (i % row_modules) as u32);
        if row >= PDF417_ROWS as u32 {
            break;
        }
        let x0 = border + col * PDF417_MODULE_PX;
        let y0 = border + row * PDF417_ROW_PX;
        for y in y0..y0 + PDF417_ROW_PX {
            for x in x0..x0 + PDF417_MODULE_PX {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    Ok(img)
}
