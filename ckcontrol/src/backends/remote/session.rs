use std::fmt;

use crate::model::SessionState;

/// Secret bearer token granting access to the remote SDK.
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        AccessToken(value.into())
    }

    /// Raw secret, to be handed to the SDK or the token store only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Connection state and token of the remote backend.
#[derive(Clone, Debug, Default)]
pub struct RemoteSession {
    pub state: SessionState,
    pub access_token: Option<AccessToken>,
}

impl RemoteSession {
    pub fn new(access_token: Option<AccessToken>) -> Self {
        Self {
            state: SessionState::Disconnected,
            access_token,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Forgets the token and goes back to `Disconnected`.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.state = SessionState::Disconnected;
    }
}
