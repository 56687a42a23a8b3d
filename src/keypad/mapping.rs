use crate::error::KeypadError;

use super::Digit;

/// Per-session bijection from digit to on-screen key identifier.
///
/// Only [`MappingBuilder::finish`] produces one, so a value of this type
/// always covers all ten digits with ten distinct keys.
#[derive(Clone, PartialEq, Eq)]
pub struct KeypadMapping {
    keys: [String; 10],
}

impl KeypadMapping {
    pub fn key_for(&self, digit: Digit) -> &str {
        &self.keys[digit.index()]
    }

    /// Reverse lookup from a key identifier back to its digit.
    pub fn digit_for(&self, key_id: &str) -> Option<Digit> {
        Digit::all().find(|d| self.keys[d.index()] == key_id)
    }
}

// Key ids are as sensitive as the password once paired with digits.
impl std::fmt::Debug for KeypadMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypadMapping").finish_non_exhaustive()
    }
}

/// Accumulates `(digit, key)` pairs from a single owner.
#[derive(Default)]
pub struct MappingBuilder {
    slots: [Option<String>; 10],
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, digit: Digit, key_id: String) -> Result<(), KeypadError> {
        if self.slots.iter().flatten().any(|existing| *existing == key_id) {
            return Err(KeypadError::DuplicateKey { key_id });
        }

        let slot = &mut self.slots[digit.index()];
        if let Some(first_key) = slot.as_ref() {
            return Err(KeypadError::DuplicateDigit {
                digit,
                first_key: first_key.clone(),
                second_key: key_id,
            });
        }
        *slot = Some(key_id);
        Ok(())
    }

    pub fn finish(self) -> Result<KeypadMapping, KeypadError> {
        let missing: Vec<Digit> = Digit::all()
            .filter(|d| self.slots[d.index()].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(KeypadError::MissingDigits { missing });
        }

        Ok(KeypadMapping {
            keys: self.slots.map(Option::unwrap_or_default),
        })
    }
}
