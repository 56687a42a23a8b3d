pub mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::AuthError;
use crate::keypad::{assemble_mapping, translate_password, CalibrationTable, Recognizer};
use crate::markup;
use crate::settings::{ChallengeSource, FormFields, LoginSettings};
use crate::transport::Transport;

pub use state::HandshakeState;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// A session the server accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub attempt_id: Uuid,
    pub authenticated_at: DateTime<Utc>,
    /// Markup of the page returned by the login POST.
    pub landing_page: String,
}

/// Values posted to the login endpoint.
struct LoginForm<'a> {
    login: &'a str,
    password: SecretString,
    challenge: String,
    csrf_token: Option<String>,
}

impl LoginForm<'_> {
    fn fields(&self, names: &FormFields) -> Vec<(String, String)> {
        let mut fields = vec![
            (names.login.clone(), self.login.to_string()),
            (names.password.clone(), self.password.expose_secret().to_string()),
            (names.challenge.clone(), self.challenge.clone()),
        ];
        if let Some(token) = &self.csrf_token {
            fields.push((names.csrf_token.clone(), token.clone()));
        }
        fields
    }
}

struct Attempt {
    id: Uuid,
    state: HandshakeState,
}

impl Attempt {
    fn advance(&mut self, to: HandshakeState) {
        debug_assert!(
            self.state.can_advance_to(to),
            "illegal handshake transition {} -> {}",
            self.state.as_str(),
            to.as_str()
        );
        log_debug!("attempt {}: {} -> {}", self.id, self.state.as_str(), to.as_str());
        self.state = to;
    }
}

/// Drives the login handshake over a [`Transport`].
pub struct Authenticator<T: Transport> {
    settings: LoginSettings,
    recognizer: Arc<Recognizer>,
    challenge_pattern: Regex,
    transport: T,
}

impl<T: Transport> Authenticator<T> {
    pub fn new(settings: LoginSettings, transport: T) -> Result<Self, AuthError> {
        let table = match settings.calibration {
            Some(quads) => CalibrationTable::from_cols_rows(quads)?,
            None => CalibrationTable::default(),
        };

        let challenge_pattern = Regex::new(&settings.challenge_pattern)
            .map_err(|err| AuthError::InvalidSettings(format!("challenge_pattern: {err}")))?;
        if challenge_pattern.captures_len() < 2 {
            return Err(AuthError::InvalidSettings(
                "challenge_pattern must capture the nonce in group 1".to_string(),
            ));
        }

        let recognizer = Recognizer::new(
            table,
            settings.foreground,
            &settings.vector_digit_attribute,
        );

        Ok(Self {
            settings,
            recognizer: Arc::new(recognizer),
            challenge_pattern,
            transport,
        })
    }

    pub fn settings(&self) -> &LoginSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one complete attempt. Nothing is retried: on failure the caller
    /// starts over with a fresh session, challenge and keypad.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedSession, AuthError> {
        let mut attempt = Attempt {
            id: Uuid::new_v4(),
            state: HandshakeState::Start,
        };
        let started = Instant::now();

        let result = self.run(&mut attempt, login, password).await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => log_info!("attempt {} authenticated in {}ms", attempt.id, elapsed_ms),
            Err(err) => log::error!(
                "attempt {} failed in state {} after {}ms ({}): {}",
                attempt.id,
                attempt.state.as_str(),
                elapsed_ms,
                err.category().as_str(),
                err
            ),
        }
        result
    }

    async fn run(
        &self,
        attempt: &mut Attempt,
        login: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedSession, AuthError> {
        let fields = &self.settings.form_fields;
        let login_url = self.settings.login_url();

        let login_page = self.transport.get(&login_url).await?;
        attempt.advance(HandshakeState::LoginPageFetched);
        let csrf_token = markup::hidden_input_value(&login_page, &fields.csrf_token);

        let form_challenge = match self.settings.challenge_source {
            ChallengeSource::LoginForm => Some(
                markup::hidden_input_value(&login_page, &fields.challenge).ok_or(
                    AuthError::ChallengeMissing {
                        location: "login form",
                    },
                )?,
            ),
            ChallengeSource::KeypadScript => None,
        };

        let keypad_page = self.transport.get(&self.settings.keypad_url()).await?;
        let challenge = match form_challenge {
            Some(challenge) => challenge,
            None => markup::script_challenge(&keypad_page, &self.challenge_pattern).ok_or(
                AuthError::ChallengeMissing {
                    location: "keypad script",
                },
            )?,
        };
        attempt.advance(HandshakeState::ChallengeExtracted);

        let records = markup::extract_buttons(&keypad_page, &self.settings.key_attribute)?;
        log_debug!("attempt {}: {} keypad buttons", attempt.id, records.len());
        let password_field = {
            let mapping = assemble_mapping(Arc::clone(&self.recognizer), records).await?;
            let sequence = translate_password(&mapping, password.expose_secret())?;
            sequence.join(&self.settings.key_delimiter)
        };
        attempt.advance(HandshakeState::KeypadResolved);

        let form = LoginForm {
            login,
            password: password_field,
            challenge,
            csrf_token,
        };
        let response = self
            .transport
            .post_form(&login_url, &form.fields(fields))
            .await?;
        attempt.advance(HandshakeState::FormSubmitted);

        if !markup::has_link_to(&response, &self.settings.logout_path) {
            attempt.advance(HandshakeState::AuthFailed);
            return Err(AuthError::LoginRejected);
        }
        attempt.advance(HandshakeState::Authenticated);

        Ok(AuthenticatedSession {
            attempt_id: attempt.id,
            authenticated_at: Utc::now(),
            landing_page: response,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine as _};

    use super::*;
    use crate::error::{FailureCategory, KeypadError, TransportError};
    use crate::keypad::testing::{render_empty, shuffled_session};
    use crate::keypad::{ButtonRecord, Encoding};

    const BASE: &str = "https://bank.test";
    const CHALLENGE: &str = "nonce-8f2e";

    struct MockTransport {
        login_page: String,
        keypad_page: Result<String, u16>,
        login_response: String,
        gets: AtomicUsize,
        posts: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl MockTransport {
        fn new(keypad_page: String) -> Self {
            Self {
                login_page: r#"<form><input type="hidden" name="form[_token]" value="csrf-1"></form>"#
                    .to_string(),
                keypad_page: Ok(keypad_page),
                login_response: r#"<nav><a href="/se-deconnecter">Logout</a></nav>"#.to_string(),
                gets: AtomicUsize::new(0),
                posts: Mutex::new(Vec::new()),
            }
        }

        fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }

        fn posted_field(&self, name: &str) -> Option<String> {
            let posts = self.posts.lock().unwrap();
            posts
                .last()?
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str) -> Result<String, TransportError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if url.contains("clavier-virtuel") {
                self.keypad_page.clone().map_err(|status| TransportError::Status {
                    url: url.to_string(),
                    status,
                })
            } else {
                Ok(self.login_page.clone())
            }
        }

        async fn post_form(
            &self,
            _url: &str,
            fields: &[(String, String)],
        ) -> Result<String, TransportError> {
            self.posts.lock().unwrap().push(fields.to_vec());
            Ok(self.login_response.clone())
        }
    }

    fn settings() -> LoginSettings {
        LoginSettings {
            base_url: BASE.to_string(),
            ..LoginSettings::default()
        }
    }

    fn keypad_html(records: &[ButtonRecord], script: &str) -> String {
        let buttons: String = records
            .iter()
            .map(|record| match &record.glyph {
                Encoding::Raster(png) => format!(
                    r#"<li><button data-matrix-key="{}" style="background-image: url(data:image/png;base64,{})"></button></li>"#,
                    record.key_id,
                    general_purpose::STANDARD.encode(png)
                ),
                Encoding::Vector(svg) => format!(
                    r#"<li><button data-matrix-key="{}" style="background-image: url(data:image/svg+xml;base64,{})"></button></li>"#,
                    record.key_id,
                    general_purpose::STANDARD.encode(svg)
                ),
            })
            .collect();
        format!(r#"<ul class="password-input">{buttons}</ul><script>{script}</script>"#)
    }

    fn challenge_script() -> String {
        format!(r#"$("[data-matrix-random-challenge]").val("{CHALLENGE}");"#)
    }

    fn password(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn submits_translated_keys_and_challenge() {
        let table = CalibrationTable::default();
        let (records, assignment) = shuffled_session(&table, 2024);
        let transport = MockTransport::new(keypad_html(&records, &challenge_script()));
        let auth = Authenticator::new(settings(), transport).unwrap();

        let session = auth.authenticate("12345678", &password("4820")).await.unwrap();
        assert!(session.landing_page.contains("se-deconnecter"));

        let expected = [4, 8, 2, 0]
            .iter()
            .map(|&d| assignment[d].as_str())
            .collect::<Vec<_>>()
            .join("|");
        let mock = auth.transport();
        assert_eq!(mock.post_count(), 1);
        assert_eq!(mock.gets.load(Ordering::SeqCst), 2);
        assert_eq!(mock.posted_field("form[password]"), Some(expected));
        assert_eq!(mock.posted_field("form[clientNumber]").as_deref(), Some("12345678"));
        assert_eq!(mock.posted_field("form[matrixRandomChallenge]").as_deref(), Some(CHALLENGE));
        assert_eq!(mock.posted_field("form[_token]").as_deref(), Some("csrf-1"));
    }

    #[tokio::test]
    async fn missing_challenge_never_submits() {
        let table = CalibrationTable::default();
        let (records, _) = shuffled_session(&table, 1);
        let transport = MockTransport::new(keypad_html(&records, "var keypad = true;"));
        let auth = Authenticator::new(settings(), transport).unwrap();

        let err = auth.authenticate("12345678", &password("1111")).await.unwrap_err();
        assert!(matches!(err, AuthError::ChallengeMissing { .. }));
        assert_eq!(err.category(), FailureCategory::CaptchaResolutionFailed);
        assert_eq!(auth.transport().post_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_glyph_never_submits() {
        let table = CalibrationTable::default();
        let (mut records, _) = shuffled_session(&table, 8);
        records[2].glyph = Encoding::Raster(render_empty());
        let transport = MockTransport::new(keypad_html(&records, &challenge_script()));
        let auth = Authenticator::new(settings(), transport).unwrap();

        let err = auth.authenticate("12345678", &password("1234")).await.unwrap_err();
        assert!(matches!(err, AuthError::Keypad(KeypadError::Glyph { .. })));
        assert_eq!(err.category().as_str(), "CAPTCHA_RESOLUTION_FAILED");
        assert_eq!(auth.transport().post_count(), 0);
    }

    #[tokio::test]
    async fn missing_logout_link_is_a_rejection() {
        let table = CalibrationTable::default();
        let (records, _) = shuffled_session(&table, 77);
        let mut transport = MockTransport::new(keypad_html(&records, &challenge_script()));
        transport.login_response = r#"<div class="form-errors">Identifiant ou mot de passe invalide</div>"#.into();
        let auth = Authenticator::new(settings(), transport).unwrap();

        let err = auth.authenticate("12345678", &password("0000")).await.unwrap_err();
        assert!(matches!(err, AuthError::LoginRejected));
        assert_eq!(err.category(), FailureCategory::LoginFailed);
        assert_eq!(auth.transport().post_count(), 1);
    }

    #[tokio::test]
    async fn keypad_outage_is_vendor_down() {
        let mut transport = MockTransport::new(String::new());
        transport.keypad_page = Err(503);
        let auth = Authenticator::new(settings(), transport).unwrap();

        let err = auth.authenticate("12345678", &password("0000")).await.unwrap_err();
        assert!(matches!(err, AuthError::ServiceUnavailable(TransportError::Status { status: 503, .. })));
        assert_eq!(err.category(), FailureCategory::VendorDown);
        assert_eq!(auth.transport().post_count(), 0);
    }

    #[tokio::test]
    async fn login_form_challenge_variant() {
        let table = CalibrationTable::default();
        let (records, assignment) = shuffled_session(&table, 303);
        let mut transport = MockTransport::new(keypad_html(&records, ""));
        transport.login_page = format!(
            r#"<form><input type="hidden" name="form[matrixRandomChallenge]" value="{CHALLENGE}"></form>"#
        );
        let auth = Authenticator::new(
            LoginSettings {
                challenge_source: ChallengeSource::LoginForm,
                ..settings()
            },
            transport,
        )
        .unwrap();

        auth.authenticate("12345678", &password("9")).await.unwrap();
        let mock = auth.transport();
        assert_eq!(mock.posted_field("form[password]"), Some(assignment[9].clone()));
        assert_eq!(mock.posted_field("form[matrixRandomChallenge]").as_deref(), Some(CHALLENGE));
        assert_eq!(mock.posted_field("form[_token]"), None);
    }

    #[tokio::test]
    async fn login_form_variant_checks_challenge_before_keypad() {
        let transport = MockTransport::new(String::new());
        let auth = Authenticator::new(
            LoginSettings {
                challenge_source: ChallengeSource::LoginForm,
                ..settings()
            },
            transport,
        )
        .unwrap();

        let err = auth.authenticate("12345678", &password("1")).await.unwrap_err();
        assert!(matches!(err, AuthError::ChallengeMissing { location: "login form" }));
        assert_eq!(auth.transport().gets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejects_unusable_settings() {
        let transport = MockTransport::new(String::new());
        let bad_pattern = LoginSettings {
            challenge_pattern: "val\\(".into(),
            ..settings()
        };
        assert!(matches!(
            Authenticator::new(bad_pattern, transport),
            Err(AuthError::InvalidSettings(_))
        ));

        let transport = MockTransport::new(String::new());
        let no_group = LoginSettings {
            challenge_pattern: "val".into(),
            ..settings()
        };
        assert!(Authenticator::new(no_group, transport).is_err());

        let transport = MockTransport::new(String::new());
        let bad_table = LoginSettings {
            calibration: Some([[1, 1, 2, 2]; 10]),
            ..settings()
        };
        assert!(matches!(
            Authenticator::new(bad_table, transport),
            Err(AuthError::Keypad(KeypadError::InvalidCalibration(_)))
        ));
    }
}
