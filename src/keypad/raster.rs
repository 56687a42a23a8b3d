use image::ImageFormat;

use crate::error::GlyphError;

/// Decoded glyph, row-major RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    /// RGB of the pixel at `(row, col)`. Callers stay within bounds.
    pub fn rgb_at(&self, row: u32, col: u32) -> [u8; 3] {
        let idx = (row as usize * self.width as usize + col as usize) * Self::CHANNELS;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}

/// Decode a PNG glyph. Truncated or corrupt payloads are rejected outright.
pub fn decode_raster(png_bytes: &[u8]) -> Result<PixelBuffer, GlyphError> {
    let img = image::load_from_memory_with_format(png_bytes, ImageFormat::Png)
        .map_err(|err| GlyphError::ImageDecode(err.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(PixelBuffer {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
