//! Synthetic keypad sessions for tests.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{ButtonRecord, CalibrationTable, Digit, Encoding};

pub const GLYPH_SIZE: u32 = 48;

const BACKGROUND: Rgba<u8> = Rgba([16, 48, 96, 255]);
const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn encode(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// A noisy glyph whose white pixels outline exactly the calibrated box of
/// `digit`. Noise pixels are random but never pure white.
pub fn render_digit(table: &CalibrationTable, digit: Digit, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = RgbaImage::from_pixel(GLYPH_SIZE, GLYPH_SIZE, BACKGROUND);

    for _ in 0..300 {
        let x = rng.gen_range(0..GLYPH_SIZE);
        let y = rng.gen_range(0..GLYPH_SIZE);
        let r = rng.gen_range(200..=254);
        let g: u8 = rng.gen();
        let b: u8 = rng.gen();
        img.put_pixel(x, y, Rgba([r, g, b, 255]));
    }

    let bounds = table.entry(digit);
    for col in bounds.first_col..=bounds.last_col {
        img.put_pixel(col, bounds.first_row, FOREGROUND);
        img.put_pixel(col, bounds.last_row, FOREGROUND);
    }
    for row in bounds.first_row..=bounds.last_row {
        img.put_pixel(bounds.first_col, row, FOREGROUND);
        img.put_pixel(bounds.last_col, row, FOREGROUND);
    }

    encode(&img)
}

/// A fully transparent black glyph with no foreground at all.
pub fn render_empty() -> Vec<u8> {
    encode(&RgbaImage::new(GLYPH_SIZE, GLYPH_SIZE))
}

/// Ten raster buttons in shuffled order with shuffled key ids.
///
/// Returns the records and, indexed by digit, the key id showing that digit.
pub fn shuffled_session(table: &CalibrationTable, seed: u64) -> (Vec<ButtonRecord>, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut key_ids: Vec<String> = (0..10).map(|i| format!("k{i}")).collect();
    key_ids.shuffle(&mut rng);

    let mut records: Vec<ButtonRecord> = Digit::all()
        .zip(&key_ids)
        .map(|(digit, key_id)| {
            let png = render_digit(table, digit, seed.wrapping_mul(31) + u64::from(digit.value()));
            ButtonRecord::new(key_id.clone(), Encoding::Raster(png))
        })
        .collect();
    records.shuffle(&mut rng);

    (records, key_ids)
}
