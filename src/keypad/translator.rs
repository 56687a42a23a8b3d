use secrecy::SecretString;

use crate::error::KeypadError;

use super::{Digit, KeypadMapping};

/// Key identifiers to press, in password order. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmittedKeySequence {
    keys: Vec<String>,
}

impl SubmittedKeySequence {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Join into the password form field value.
    pub fn join(&self, delimiter: &str) -> SecretString {
        SecretString::from(self.keys.join(delimiter))
    }
}

impl std::fmt::Debug for SubmittedKeySequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubmittedKeySequence({} keys)", self.keys.len())
    }
}

/// Map each password character through the session keypad.
pub fn translate_password(
    mapping: &KeypadMapping,
    password: &str,
) -> Result<SubmittedKeySequence, KeypadError> {
    let keys = password
        .chars()
        .map(|character| {
            Digit::from_char(character)
                .map(|digit| mapping.key_for(digit).to_string())
                .ok_or(KeypadError::UnmappedDigit { character })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubmittedKeySequence { keys })
}
