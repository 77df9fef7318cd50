use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ControlError;

/// Verbosity requested from the remote SDK.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteLogLevel {
    Debug,
    #[default]
    Info,
    Error,
}

impl RemoteLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteLogLevel::Debug => "debug",
            RemoteLogLevel::Info => "info",
            RemoteLogLevel::Error => "error",
        }
    }
}

impl fmt::Display for RemoteLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteLogLevel {
    type Err = ControlError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(RemoteLogLevel::Debug),
            "info" => Ok(RemoteLogLevel::Info),
            "error" => Ok(RemoteLogLevel::Error),
            other => Err(ControlError::InvalidConfig(format!(
                "unknown remote log level '{other}'"
            ))),
        }
    }
}

/// Registration of this application with the remote SDK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub client_id: String,
    pub redirect_url: Url,
    pub log_level: RemoteLogLevel,
}

impl RemoteConfig {
    const EMPTY_CLIENT_ID: &'static str = "123";
    const EMPTY_REDIRECT_URL: &'static str = "controlkit://456";

    /// Fails with [`ControlError::InvalidConfig`] when `redirect_url` is not a
    /// valid absolute URL.
    pub fn new(client_id: impl Into<String>, redirect_url: &str) -> Result<Self, ControlError> {
        let redirect_url = Url::parse(redirect_url).map_err(|e| {
            ControlError::InvalidConfig(format!("invalid redirect URL '{redirect_url}': {e}"))
        })?;
        Ok(Self {
            client_id: client_id.into(),
            redirect_url,
            log_level: RemoteLogLevel::default(),
        })
    }

    pub fn with_log_level(mut self, log_level: RemoteLogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Placeholder registration. A controller built with it never connects
    /// on its own.
    pub fn empty() -> Self {
        Self {
            client_id: Self::EMPTY_CLIENT_ID.to_string(),
            redirect_url: Url::parse(Self::EMPTY_REDIRECT_URL)
                .unwrap_or_else(|_| unreachable!("static redirect URL is valid")),
            log_level: RemoteLogLevel::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::empty()
    }
}
