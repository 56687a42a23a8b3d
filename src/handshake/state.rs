use serde::Serialize;

/// Linear progress of one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HandshakeState {
    Start,
    LoginPageFetched,
    ChallengeExtracted,
    KeypadResolved,
    FormSubmitted,
    Authenticated,
    AuthFailed,
}

impl Default for HandshakeState {
    fn default() -> Self {
        HandshakeState::Start
    }
}

impl HandshakeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeState::Start => "Start",
            HandshakeState::LoginPageFetched => "LoginPageFetched",
            HandshakeState::ChallengeExtracted => "ChallengeExtracted",
            HandshakeState::KeypadResolved => "KeypadResolved",
            HandshakeState::FormSubmitted => "FormSubmitted",
            HandshakeState::Authenticated => "Authenticated",
            HandshakeState::AuthFailed => "AuthFailed",
        }
    }

    /// The only state reachable from `self`. Terminal states have none.
    pub fn next(&self) -> Option<HandshakeState> {
        match self {
            HandshakeState::Start => Some(HandshakeState::LoginPageFetched),
            HandshakeState::LoginPageFetched => Some(HandshakeState::ChallengeExtracted),
            HandshakeState::ChallengeExtracted => Some(HandshakeState::KeypadResolved),
            HandshakeState::KeypadResolved => Some(HandshakeState::FormSubmitted),
            HandshakeState::FormSubmitted => Some(HandshakeState::Authenticated),
            HandshakeState::Authenticated | HandshakeState::AuthFailed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Whether moving to `to` is legal. `AuthFailed` is only reachable once
    /// the form has been submitted; earlier failures abort without a state.
    pub fn can_advance_to(&self, to: HandshakeState) -> bool {
        self.next() == Some(to)
            || (*self == HandshakeState::FormSubmitted && to == HandshakeState::AuthFailed)
    }
}
