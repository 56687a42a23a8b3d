//! Regex-level scraping of the login and keypad pages.
//!
//! Only the handful of constructs the handshake needs are understood: start
//! tags with quoted attributes, inline `<script>` bodies and base64 data URIs.

use std::sync::LazyLock;

use base64::{engine::general_purpose, Engine as _};
use regex::Regex;

use crate::error::MarkupError;
use crate::keypad::{ButtonRecord, Encoding};

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").expect("valid tag pattern"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'=<>/]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute pattern")
});

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid script pattern")
});

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data:image/([a-zA-Z0-9.+-]+);base64,([A-Za-z0-9+/=]+)")
        .expect("valid data uri pattern")
});

struct Tag<'a> {
    name: &'a str,
    attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

fn tags(html: &str) -> impl Iterator<Item = Tag<'_>> {
    TAG.captures_iter(html).map(|caps| {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        let attributes = ATTRIBUTE
            .captures_iter(body)
            .filter_map(|attr| {
                let key = attr.get(1)?.as_str();
                let value = attr.get(2).or_else(|| attr.get(3)).or_else(|| attr.get(4))?;
                Some((key, value.as_str()))
            })
            .collect();
        Tag { name, attributes }
    })
}

/// Every keypad button in document order.
pub fn extract_buttons(html: &str, key_attribute: &str) -> Result<Vec<ButtonRecord>, MarkupError> {
    let mut records = Vec::new();

    for tag in tags(html) {
        let Some(key_id) = tag.attribute(key_attribute) else {
            continue;
        };
        let caps = tag
            .attributes
            .iter()
            .find_map(|&(_, value)| DATA_URI.captures(value))
            .ok_or_else(|| MarkupError::MissingGlyph {
                key_id: key_id.to_string(),
            })?;

        let media_type = caps.get(1).map_or("", |m| m.as_str());
        let payload = caps.get(2).map_or("", |m| m.as_str());
        let bytes = general_purpose::STANDARD.decode(payload).map_err(|err| {
            MarkupError::InvalidGlyphEncoding {
                key_id: key_id.to_string(),
                reason: err.to_string(),
            }
        })?;

        let glyph = if media_type.starts_with("svg") {
            let markup = String::from_utf8(bytes).map_err(|err| MarkupError::InvalidGlyphEncoding {
                key_id: key_id.to_string(),
                reason: err.to_string(),
            })?;
            Encoding::Vector(markup)
        } else {
            Encoding::Raster(bytes)
        };
        records.push(ButtonRecord::new(key_id, glyph));
    }

    if records.is_empty() {
        return Err(MarkupError::NoButtons);
    }
    Ok(records)
}

/// First capture of `pattern` inside any inline script body.
pub fn script_challenge(html: &str, pattern: &Regex) -> Option<String> {
    SCRIPT
        .captures_iter(html)
        .filter_map(|script| script.get(1))
        .find_map(|body| pattern.captures(body.as_str()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|value| !value.is_empty())
}

/// Value of the `<input>` named `name`, if present and non-empty.
pub fn hidden_input_value(html: &str, name: &str) -> Option<String> {
    tags(html)
        .filter(|tag| tag.name.eq_ignore_ascii_case("input"))
        .find(|tag| tag.attribute("name") == Some(name))
        .and_then(|tag| tag.attribute("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Whether the page links to `href`, e.g. a logout affordance.
pub fn has_link_to(html: &str, href: &str) -> bool {
    tags(html)
        .filter(|tag| tag.name.eq_ignore_ascii_case("a"))
        .any(|tag| tag.attribute("href") == Some(href))
}
