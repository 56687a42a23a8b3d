//! Error taxonomy for one login attempt.
//!
//! Every variant aborts the attempt. Nothing here is retried internally:
//! recognition and markup parsing are deterministic for a given server
//! response, so only the caller can decide to start a fresh attempt.

use thiserror::Error;

use crate::keypad::Digit;

/// Failure to turn a single glyph into a digit.
#[derive(Debug, Error)]
pub enum GlyphError {
    /// The raster payload is not a well-formed PNG.
    #[error("glyph payload could not be decoded: {0}")]
    ImageDecode(String),

    /// The glyph decoded but matched no calibrated digit.
    #[error("glyph does not match any calibrated digit: {0}")]
    DigitNotRecognized(String),
}

/// Failure while building or using the per-session keypad mapping.
#[derive(Debug, Error)]
pub enum KeypadError {
    /// Recognition of one button failed.
    #[error("key {key_id}: {source}")]
    Glyph {
        /// Session-scoped key identifier of the failing button.
        key_id: String,
        #[source]
        source: GlyphError,
    },

    /// Two buttons were recognized as the same digit.
    #[error("digit {digit} resolved by both key {first_key} and key {second_key}")]
    DuplicateDigit {
        digit: Digit,
        first_key: String,
        second_key: String,
    },

    /// One key identifier appeared on two buttons.
    #[error("key {key_id} appears on more than one button")]
    DuplicateKey { key_id: String },

    /// Fewer than ten distinct digits after consuming every button.
    #[error("keypad is incomplete, missing digits {missing:?}")]
    MissingDigits { missing: Vec<Digit> },

    /// A recognition task died before reporting.
    #[error("recognition worker failed: {0}")]
    Worker(String),

    /// The password holds a character the mapping cannot translate.
    #[error("password character {character:?} has no key on this keypad")]
    UnmappedDigit { character: char },

    /// The calibration table is unusable.
    #[error("invalid calibration table: {0}")]
    InvalidCalibration(String),
}

impl KeypadError {
    /// True for the duplicate/missing/worker class of assembly faults.
    pub fn is_assembly_fault(&self) -> bool {
        matches!(
            self,
            KeypadError::DuplicateDigit { .. }
                | KeypadError::DuplicateKey { .. }
                | KeypadError::MissingDigits { .. }
                | KeypadError::Worker(_)
        )
    }
}

/// Errors raised by the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Required markup was absent from a fetched page.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("no keypad buttons found")]
    NoButtons,

    #[error("button {key_id} carries no glyph data URI")]
    MissingGlyph { key_id: String },

    #[error("button {key_id} glyph is not valid base64: {reason}")]
    InvalidGlyphEncoding { key_id: String, reason: String },
}

/// Outcome of a failed authentication attempt.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Keypad(#[from] KeypadError),

    #[error("keypad markup unusable: {0}")]
    Markup(#[from] MarkupError),

    /// The session nonce was not where the protocol variant expects it.
    #[error("challenge nonce not found in {location}")]
    ChallengeMissing { location: &'static str },

    /// The form was submitted but the logged-in marker is absent.
    #[error("login rejected: logged-in marker absent from response")]
    LoginRejected,

    #[error("service unavailable: {0}")]
    ServiceUnavailable(#[from] TransportError),

    #[error("invalid login settings: {0}")]
    InvalidSettings(String),
}

/// Coarse failure classes surfaced to whoever hosts the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    CaptchaResolutionFailed,
    LoginFailed,
    VendorDown,
    Internal,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::CaptchaResolutionFailed => "CAPTCHA_RESOLUTION_FAILED",
            FailureCategory::LoginFailed => "LOGIN_FAILED",
            FailureCategory::VendorDown => "VENDOR_DOWN",
            FailureCategory::Internal => "INTERNAL_ERROR",
        }
    }
}

impl AuthError {
    pub fn category(&self) -> FailureCategory {
        match self {
            AuthError::Keypad(KeypadError::UnmappedDigit { .. })
            | AuthError::Keypad(KeypadError::InvalidCalibration(_))
            | AuthError::InvalidSettings(_) => FailureCategory::Internal,
            AuthError::Keypad(_) | AuthError::Markup(_) | AuthError::ChallengeMissing { .. } => {
                FailureCategory::CaptchaResolutionFailed
            }
            AuthError::LoginRejected => FailureCategory::LoginFailed,
            AuthError::ServiceUnavailable(_) => FailureCategory::VendorDown,
        }
    }
}
