use crate::error::{GlyphError, KeypadError};

use super::bounds::BoundingBox;
use super::Digit;

/// Glyph extents of the keypad renderer, indexed by digit, as
/// `[first_col, first_row, last_col, last_row]`.
///
/// Background pixels are re-randomized every session but the white glyph
/// pixels never move. These values go stale only when the renderer changes.
const DIGIT_BOUNDS: [[u32; 4]; 10] = [
    [17, 7, 24, 17],
    [18, 6, 21, 18],
    [9, 7, 32, 34],
    [10, 7, 31, 34],
    [11, 6, 29, 34],
    [14, 6, 28, 34],
    [7, 7, 34, 34],
    [5, 6, 36, 34],
    [8, 7, 32, 34],
    [4, 7, 38, 34],
];

/// Reference bounding box for each digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationTable {
    entries: [BoundingBox; 10],
}

impl CalibrationTable {
    /// Validate a table: every entry well formed and no two digits sharing
    /// a box, otherwise exact matching would be ambiguous.
    pub fn new(entries: [BoundingBox; 10]) -> Result<Self, KeypadError> {
        for (digit, entry) in entries.iter().enumerate() {
            if !entry.is_well_formed() {
                return Err(KeypadError::InvalidCalibration(format!(
                    "digit {digit} has inverted bounds ({entry})"
                )));
            }
            if let Some(other) = entries[..digit].iter().position(|e| e == entry) {
                return Err(KeypadError::InvalidCalibration(format!(
                    "digits {other} and {digit} share bounds ({entry})"
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_cols_rows(quads: [[u32; 4]; 10]) -> Result<Self, KeypadError> {
        Self::new(quads.map(BoundingBox::from_cols_rows))
    }

    pub fn entry(&self, digit: Digit) -> BoundingBox {
        self.entries[digit.index()]
    }

    /// Exact lookup. There is no nearest-match fallback: a box that matches
    /// nothing means the renderer changed and the table needs recalibrating.
    pub fn match_digit(&self, bounds: &BoundingBox) -> Result<Digit, GlyphError> {
        Digit::all()
            .find(|d| self.entries[d.index()] == *bounds)
            .ok_or_else(|| {
                GlyphError::DigitNotRecognized(format!(
                    "bounds ({bounds}) are not in the calibration table"
                ))
            })
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            entries: DIGIT_BOUNDS.map(BoundingBox::from_cols_rows),
        }
    }
}
