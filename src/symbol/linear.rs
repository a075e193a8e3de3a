//! Linear (1-D) barcode encoding and rasterization.
//!
//! Uses the barcoders crate for module encoding. Each encoded module is `1`
//! (bar) or `0` (space); rasterization widens modules to
//! [`RenderParams::module_px`] and surrounds them with the quiet zone.

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;
use image::{Rgb, RgbImage};

use super::EncodeError;
use super::params::RenderParams;
use crate::caption::font::CaptionFont;
use crate::symbology::Symbology;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Code 128 character set B prefix (uppercase, lowercase, digits, punctuation).
const CODE128_SET_B: char = '\u{0181}';
/// Code 128 character set C prefix (digit pairs, one symbol character each).
const CODE128_SET_C: char = '\u{0106}';

/// Set C halves the width of numeric codes but only takes whole digit pairs.
fn code128_data(code: &str) -> String {
    let digit_pairs =
        !code.is_empty() && code.len() % 2 == 0 && code.bytes().all(|b| b.is_ascii_digit());
    let set = if digit_pairs { CODE128_SET_C } else { CODE128_SET_B };
    format!("{set}{code}")
}

fn rejected(symbology: Symbology, code: &str, reason: impl ToString) -> EncodeError {
    EncodeError::Rejected {
        symbology,
        code: code.to_string(),
        reason: reason.to_string(),
    }
}

/// GS1 check digit for a digit-only payload.
fn gs1_check_digit(payload: &str) -> Option<u32> {
    let mut sum = 0;
    for (i, c) in payload.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        sum += if i % 2 == 0 { digit * 3 } else { digit };
    }
    Some((10 - sum % 10) % 10)
}

/// Drop a trailing check digit from a full-length GS1 code after verifying it.
///
/// The encoders take the payload only and compute the check digit themselves.
/// Codes of any other length pass through for the encoder to judge.
fn gs1_payload(symbology: Symbology, code: &str, payload_len: usize) -> Result<String, EncodeError> {
    if code.len() != payload_len + 1 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(code.to_string());
    }

    let (payload, given) = code.split_at(payload_len);
    match (gs1_check_digit(payload), given.parse::<u32>()) {
        (Some(expected), Ok(given)) if expected == given => Ok(payload.to_string()),
        _ => Err(rejected(symbology, code, "check digit does not match")),
    }
}

/// Encode `code` into bar/space modules.
pub fn encode(symbology: Symbology, code: &str) -> Result<Vec<u8>, EncodeError> {
    let encoded = match symbology {
        Symbology::Code128 => Code128::new(&code128_data(code)).map(|b| b.encode()),
        Symbology::Code39 => Code39::new(code).map(|b| b.encode()),
        Symbology::Ean13 => EAN13::new(&gs1_payload(symbology, code, 12)?).map(|b| b.encode()),
        Symbology::Ean8 => EAN8::new(&gs1_payload(symbology, code, 7)?).map(|b| b.encode()),
        // UPC-A is EAN-13 with a leading zero
        Symbology::UpcA => {
            if !matches!(code.len(), 11 | 12) {
                return Err(rejected(symbology, code, "UPC-A needs 11 or 12 digits"));
            }
            let payload = gs1_payload(symbology, code, 11)?;
            EAN13::new(&format!("0{payload}")).map(|b| b.encode())
        }
        Symbology::Itf => TF::interleaved(code).map(|b| b.encode()),
        Symbology::DataMatrix | Symbology::Pdf417 => {
            return Err(EncodeError::NotLinear(symbology));
        }
    };

    let modules = encoded.map_err(|e| rejected(symbology, code, e))?;
    if modules.is_empty() {
        return Err(rejected(symbology, code, "encoder produced no modules"));
    }
    Ok(modules)
}

/// Rasterize modules into an RGB image.
///
/// When `human_text` is given it is drawn centred under the bars, the way a
/// printed barcode shows its data.
pub fn rasterize(
    modules: &[u8],
    params: &RenderParams,
    human_text: Option<&str>,
    font: &CaptionFont,
) -> RgbImage {
    let module_px = params.module_px();
    let quiet = params.quiet_zone_px();
    let bar_height = params.bar_height_px();

    let text_px = params.text_px();
    let text_band = match human_text {
        Some(_) => params.text_gap_px() + font.line_height(text_px),
        None => 0,
    };

    let width = modules.len() as u32 * module_px + 2 * quiet;
    let height = bar_height + text_band + quiet / 2;
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    for (i, &module) in modules.iter().enumerate() {
        if module != 1 {
            continue;
        }
        let x0 = quiet + i as u32 * module_px;
        for x in x0..x0 + module_px {
            for y in 0..bar_height {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    if let Some(text) = human_text {
        let text_width = font.text_width(text, text_px);
        let x = (width.saturating_sub(text_width) / 2) as i64;
        let y = (bar_height + params.text_gap_px()) as i64;
        font.draw_text(&mut img, text, x, y, text_px, BLACK);
    }

    img
}
