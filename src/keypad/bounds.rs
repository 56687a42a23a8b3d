use std::fmt;

use serde::{Deserialize, Serialize};

use super::raster::PixelBuffer;

/// Exact RGB colour. Alpha is never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    fn matches(self, px: [u8; 3]) -> bool {
        px == [self.0, self.1, self.2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Minimal rectangle enclosing every foreground pixel, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl BoundingBox {
    /// Build from the `[first_col, first_row, last_col, last_row]` order used
    /// by calibration sheets.
    pub const fn from_cols_rows(quad: [u32; 4]) -> Self {
        Self {
            first_row: quad[1],
            last_row: quad[3],
            first_col: quad[0],
            last_col: quad[2],
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.first_row <= self.last_row && self.first_col <= self.last_col
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..={}, cols {}..={}",
            self.first_row, self.last_row, self.first_col, self.last_col
        )
    }
}

/// Scan for pixels exactly equal to `foreground`. `None` when there are none.
///
/// Rows and columns are walked in separate passes, both addressing pixels as
/// `row * width + col`.
pub fn extract_bounds(buffer: &PixelBuffer, foreground: Rgb) -> Option<BoundingBox> {
    let row_hit = |row: u32| (0..buffer.width).any(|col| foreground.matches(buffer.rgb_at(row, col)));
    let col_hit = |col: u32| (0..buffer.height).any(|row| foreground.matches(buffer.rgb_at(row, col)));

    let first_row = (0..buffer.height).find(|&row| row_hit(row))?;
    let last_row = (first_row..buffer.height).rev().find(|&row| row_hit(row))?;
    let first_col = (0..buffer.width).find(|&col| col_hit(col))?;
    let last_col = (first_col..buffer.width).rev().find(|&col| col_hit(col))?;

    Some(BoundingBox {
        first_row,
        last_row,
        first_col,
        last_col,
    })
}
