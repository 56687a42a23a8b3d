use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::keypad::Rgb;

/// Where the session nonce lives for a given protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeSource {
    /// Inline script of the keypad resource, matched by `challenge_pattern`.
    KeypadScript,
    /// Hidden input on the login page named after the challenge form field.
    LoginForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub login: String,
    pub password: String,
    pub challenge: String,
    pub csrf_token: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            login: "form[clientNumber]".into(),
            password: "form[password]".into(),
            challenge: "form[matrixRandomChallenge]".into(),
            csrf_token: "form[_token]".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    pub base_url: String,
    pub login_path: String,
    pub keypad_path: String,
    pub logout_path: String,
    pub form_fields: FormFields,
    pub key_delimiter: String,
    pub key_attribute: String,
    pub challenge_source: ChallengeSource,
    pub challenge_pattern: String,
    pub vector_digit_attribute: String,
    pub foreground: Rgb,
    /// Replacement calibration, `[first_col, first_row, last_col, last_row]`
    /// per digit. `None` keeps the built-in table.
    pub calibration: Option<[[u32; 4]; 10]>,
    pub request_timeout_secs: u64,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            base_url: "https://clients.boursorama.com".into(),
            login_path: "/connexion/saisie-mot-de-passe".into(),
            keypad_path: "/connexion/clavier-virtuel?_hinclude=1".into(),
            logout_path: "/se-deconnecter".into(),
            form_fields: FormFields::default(),
            key_delimiter: "|".into(),
            key_attribute: "data-matrix-key".into(),
            challenge_source: ChallengeSource::KeypadScript,
            challenge_pattern: r#"val\("(.+?)"\)"#.into(),
            vector_digit_attribute: "id".into(),
            foreground: Rgb::WHITE,
            calibration: None,
            request_timeout_secs: 30,
        }
    }
}

impl LoginSettings {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read login settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse login settings in {}", path.display()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn login_url(&self) -> String {
        self.url(&self.login_path)
    }

    pub fn keypad_url(&self) -> String {
        self.url(&self.keypad_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
