pub mod error;
pub mod handshake;
pub mod keypad;
pub mod markup;
pub mod settings;
pub mod transport;
mod utils;

use anyhow::Context;
use secrecy::SecretString;

pub use error::{AuthError, FailureCategory, GlyphError, KeypadError, MarkupError, TransportError};
pub use handshake::{AuthenticatedSession, Authenticator, HandshakeState};
pub use keypad::{
    assemble_mapping, translate_password, BoundingBox, ButtonRecord, CalibrationTable, Digit,
    Encoding, KeypadMapping, Recognizer, SubmittedKeySequence,
};
pub use settings::{ChallengeSource, LoginSettings};
pub use transport::{HttpTransport, Transport};
pub use utils::logging::init_logging;

const LOGIN_ENV: &str = "KEYPAD_LOGIN";
const PASSWORD_ENV: &str = "KEYPAD_PASSWORD";

/// One login attempt with settings from `settings_path` (defaults when
/// `None`) and credentials from the environment.
pub async fn run(settings_path: Option<String>) -> anyhow::Result<AuthenticatedSession> {
    init_logging();

    let settings = match settings_path {
        Some(path) => LoginSettings::load(&path)?,
        None => LoginSettings::default(),
    };
    log::info!("Authenticating against {}", settings.base_url);

    let login = std::env::var(LOGIN_ENV).with_context(|| format!("{LOGIN_ENV} is not set"))?;
    let password = std::env::var(PASSWORD_ENV)
        .map(SecretString::from)
        .with_context(|| format!("{PASSWORD_ENV} is not set"))?;

    let transport = HttpTransport::new(settings.request_timeout())
        .context("failed to build HTTP client")?;
    let authenticator = Authenticator::new(settings, transport)?;

    let session = authenticator
        .authenticate(&login, &password)
        .await
        .map_err(|err| anyhow::anyhow!("{}: {err}", err.category().as_str()))?;
    log::info!("Successfully logged in (attempt {})", session.attempt_id);
    Ok(session)
}
