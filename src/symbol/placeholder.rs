//! Error placeholder image for codes that could not be encoded.

use image::{Rgb, RgbImage};

use crate::caption::font::CaptionFont;

pub const PLACEHOLDER_WIDTH: u32 = 200;
pub const PLACEHOLDER_HEIGHT: u32 = 100;

const BORDER_PX: u32 = 2;
const LABEL_MAX_CHARS: usize = 20;
const TEXT_PX: f32 = 12.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// 200x100 white image with a red border, `Error: <code>` and `Invalid code`.
///
/// Always drawn with the bitmap font so it cannot fail.
pub fn placeholder(code: &str) -> RgbImage {
    let mut img = RgbImage::from_pixel(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, WHITE);

    for x in 0..PLACEHOLDER_WIDTH {
        for t in 0..BORDER_PX {
            img.put_pixel(x, t, RED);
            img.put_pixel(x, PLACEHOLDER_HEIGHT - 1 - t, RED);
        }
    }
    for y in 0..PLACEHOLDER_HEIGHT {
        for t in 0..BORDER_PX {
            img.put_pixel(t, y, RED);
            img.put_pixel(PLACEHOLDER_WIDTH - 1 - t, y, RED);
        }
    }

    let label: String = format!("Error: {code}").chars().take(LABEL_MAX_CHARS).collect();
    let font = CaptionFont::Bitmap;
    font.draw_text(&mut img, &label, 10, 10, TEXT_PX, RED);
    font.draw_text(&mut img, "Invalid code", 10, 30, TEXT_PX, RED);

    img
}
