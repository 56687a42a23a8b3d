use regex::Regex;

use crate::error::GlyphError;

use super::Digit;

pub const DEFAULT_ATTRIBUTE: &str = "id";

/// Pattern capturing every value of `attribute` in a piece of markup.
pub(crate) fn attribute_pattern(attribute: &str) -> Regex {
    let pattern = format!(
        r#"(?:^|[\s<"'])\s*{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attribute)
    );
    Regex::new(&pattern).expect("escaped attribute name is a valid pattern")
}

/// Read the digit a vector glyph declares about itself.
pub fn recognize(markup: &str, attribute: &str) -> Result<Digit, GlyphError> {
    recognize_with(&attribute_pattern(attribute), markup)
}

pub(crate) fn recognize_with(pattern: &Regex, markup: &str) -> Result<Digit, GlyphError> {
    let mut found: Option<Digit> = None;

    for caps in pattern.captures_iter(markup) {
        let value = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let Some(digit) = single_digit(value.trim()) else {
            continue;
        };
        match found {
            Some(prev) if prev != digit => {
                return Err(GlyphError::DigitNotRecognized(format!(
                    "vector glyph declares both {prev} and {digit}"
                )));
            }
            _ => found = Some(digit),
        }
    }

    found.ok_or_else(|| {
        GlyphError::DigitNotRecognized("vector glyph carries no digit attribute".to_string())
    })
}

fn single_digit(value: &str) -> Option<Digit> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Digit::from_char(c),
        _ => None,
    }
}
