pub mod assembler;
pub mod bounds;
pub mod calibration;
pub mod mapping;
pub mod raster;
pub mod translator;
pub mod vector;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use regex::Regex;

use crate::error::GlyphError;

pub use assembler::assemble_mapping;
pub use bounds::{extract_bounds, BoundingBox, Rgb};
pub use calibration::CalibrationTable;
pub use mapping::{KeypadMapping, MappingBuilder};
pub use raster::{decode_raster, PixelBuffer};
pub use translator::{translate_password, SubmittedKeySequence};

/// A single decimal digit, 0 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Digit = Digit(0);

    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Digit(value))
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|v| Digit(v as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Digit> {
        (0..=9).map(Digit)
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a button's glyph was delivered.
#[derive(Clone, PartialEq, Eq)]
pub enum Encoding {
    /// Compressed PNG bytes, recognized by bounding box.
    Raster(Vec<u8>),
    /// SVG markup that names its digit in an attribute.
    Vector(String),
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Raster(bytes) => write!(f, "Raster({} bytes)", bytes.len()),
            Encoding::Vector(markup) => write!(f, "Vector({} chars)", markup.len()),
        }
    }
}

/// One on-screen key of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRecord {
    pub key_id: String,
    pub glyph: Encoding,
}

impl ButtonRecord {
    pub fn new(key_id: impl Into<String>, glyph: Encoding) -> Self {
        Self {
            key_id: key_id.into(),
            glyph,
        }
    }
}

/// Read-only recognition context shared by every glyph task of an attempt.
#[derive(Debug)]
pub struct Recognizer {
    table: CalibrationTable,
    foreground: Rgb,
    vector_attribute: Regex,
}

impl Recognizer {
    pub fn new(table: CalibrationTable, foreground: Rgb, vector_attribute: &str) -> Self {
        Self {
            table,
            foreground,
            vector_attribute: vector::attribute_pattern(vector_attribute),
        }
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Resolve one glyph to its digit using the strategy its encoding selects.
    pub fn recognize(&self, glyph: &Encoding) -> Result<Digit, GlyphError> {
        match glyph {
            Encoding::Raster(bytes) => {
                let buffer = decode_raster(bytes)?;
                let bounds = extract_bounds(&buffer, self.foreground).ok_or_else(|| {
                    GlyphError::DigitNotRecognized(format!(
                        "no pixel in foreground colour {} ({}x{} image)",
                        self.foreground, buffer.width, buffer.height
                    ))
                })?;
                self.table.match_digit(&bounds)
            }
            Encoding::Vector(markup) => vector::recognize_with(&self.vector_attribute, markup),
        }
    }
}

impl Default for Recognizer {
    fn default() -> Self {
        Self::new(CalibrationTable::default(), Rgb::WHITE, vector::DEFAULT_ATTRIBUTE)
    }
}
