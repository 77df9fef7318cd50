//! Extension pour intégrer la configuration du contrôleur dans ckconfig
//!
//! Ce module fournit le trait [`ControlConfigExt`], qui ajoute à
//! `ckconfig::Config` l'accès typé aux réglages du contrôleur, et
//! [`ConfigTokenStore`], qui persiste le token d'accès chiffré dans le
//! fichier de configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use ckconfig::Config;
use ckconfig::encryption;
use serde_yaml::Value;
use tracing::warn;

use crate::backends::remote::{RemoteConfig, RemoteLogLevel};
use crate::model::BackendSelection;
use crate::system_controller::ControllerSettings;
use crate::token_store::{StoreError, TokenStore};
use crate::volume::UnitLevel;

const DEFAULT_TOKEN_KEY: &str = "remote_access_token";
const DEFAULT_STATE_QUERY_TIMEOUT_MS: u64 = 5000;

/// Typed access to the controller settings stored in a `ckconfig::Config`.
///
/// # Exemple
///
/// ```rust,ignore
/// use ckconfig::Config;
/// use ckcontrol::ControlConfigExt;
///
/// let config = Config::load_config("")?;
/// let remote = config.remote_config()?;
/// println!("Remote client: {}", remote.client_id);
/// ```
pub trait ControlConfigExt {
    fn get_remote_client_id(&self) -> Result<String>;
    fn set_remote_client_id(&self, client_id: &str) -> Result<()>;

    fn get_remote_redirect_url(&self) -> Result<String>;
    fn set_remote_redirect_url(&self, redirect_url: &str) -> Result<()>;

    fn get_remote_log_level(&self) -> Result<RemoteLogLevel>;
    fn set_remote_log_level(&self, level: RemoteLogLevel) -> Result<()>;

    fn get_remote_auto_connect(&self) -> Result<bool>;
    fn set_remote_auto_connect(&self, enabled: bool) -> Result<()>;

    /// Key the access token is stored under in `remote.tokens`.
    fn get_remote_token_key(&self) -> Result<String>;

    fn get_state_query_timeout(&self) -> Result<Duration>;
    fn set_state_query_timeout(&self, timeout: Duration) -> Result<()>;

    /// `volume.step`, clamped to `[0, 1]`.
    fn get_volume_step_level(&self) -> Result<UnitLevel>;

    fn get_default_selection(&self) -> Result<BackendSelection>;
    fn set_default_selection(&self, selection: BackendSelection) -> Result<()>;

    /// Builds the remote registration from `remote.*`.
    ///
    /// # Errors
    ///
    /// Fails when the redirect URL is not a valid URL.
    fn remote_config(&self) -> Result<RemoteConfig>;

    /// Every setting a [`crate::SystemController`] needs, without a token
    /// store.
    fn controller_settings(&self) -> Result<ControllerSettings>;
}

impl ControlConfigExt for Config {
    fn get_remote_client_id(&self) -> Result<String> {
        match self.get_value(&["remote", "client_id"])? {
            Value::String(s) if !s.is_empty() => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(anyhow!("Remote client id not configured")),
        }
    }

    fn set_remote_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &["remote", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_remote_redirect_url(&self) -> Result<String> {
        match self.get_value(&["remote", "redirect_url"])? {
            Value::String(s) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!("Remote redirect URL not configured")),
        }
    }

    fn set_remote_redirect_url(&self, redirect_url: &str) -> Result<()> {
        self.set_value(
            &["remote", "redirect_url"],
            Value::String(redirect_url.to_string()),
        )
    }

    fn get_remote_log_level(&self) -> Result<RemoteLogLevel> {
        match self.get_value(&["remote", "log_level"]) {
            Ok(Value::String(s)) => s.parse().map_err(|e| anyhow!("{}", e)),
            _ => Ok(RemoteLogLevel::default()),
        }
    }

    fn set_remote_log_level(&self, level: RemoteLogLevel) -> Result<()> {
        self.set_value(
            &["remote", "log_level"],
            Value::String(level.as_str().to_string()),
        )
    }

    fn get_remote_auto_connect(&self) -> Result<bool> {
        match self.get_value(&["remote", "auto_connect"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(true),
        }
    }

    fn set_remote_auto_connect(&self, enabled: bool) -> Result<()> {
        self.set_value(&["remote", "auto_connect"], Value::Bool(enabled))
    }

    fn get_remote_token_key(&self) -> Result<String> {
        Ok(self.get_string_or(&["remote", "token_key"], DEFAULT_TOKEN_KEY))
    }

    fn get_state_query_timeout(&self) -> Result<Duration> {
        match self.get_value(&["remote", "state_query_timeout_ms"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(Duration::from_millis)
                .ok_or_else(|| anyhow!("remote.state_query_timeout_ms must be a positive integer")),
            _ => Ok(Duration::from_millis(DEFAULT_STATE_QUERY_TIMEOUT_MS)),
        }
    }

    fn set_state_query_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_value(
            &["remote", "state_query_timeout_ms"],
            Value::Number((timeout.as_millis() as u64).into()),
        )
    }

    fn get_volume_step_level(&self) -> Result<UnitLevel> {
        Ok(UnitLevel::new(self.get_volume_step()? as f32))
    }

    fn get_default_selection(&self) -> Result<BackendSelection> {
        match self.get_value(&["playback", "default_selection"]) {
            Ok(Value::String(s)) => s.parse().map_err(|e| anyhow!("{}", e)),
            _ => Ok(BackendSelection::default()),
        }
    }

    fn set_default_selection(&self, selection: BackendSelection) -> Result<()> {
        self.set_value(
            &["playback", "default_selection"],
            Value::String(selection.as_str().to_string()),
        )
    }

    fn remote_config(&self) -> Result<RemoteConfig> {
        let client_id = self.get_remote_client_id()?;
        let redirect_url = self.get_remote_redirect_url()?;
        let config = RemoteConfig::new(client_id, &redirect_url)
            .map_err(|e| anyhow!("{}", e))?
            .with_log_level(self.get_remote_log_level()?);
        Ok(config)
    }

    fn controller_settings(&self) -> Result<ControllerSettings> {
        Ok(ControllerSettings {
            remote_config: self.remote_config()?,
            token_store: None,
            auto_connect: self.get_remote_auto_connect()?,
            volume_step: self.get_volume_step_level()?,
            state_query_timeout: self.get_state_query_timeout()?,
            default_selection: self.get_default_selection()?,
        })
    }
}

/// [`TokenStore`] writing the token, encrypted, under
/// `remote.tokens.<coding_key>` of a `ckconfig::Config`.
pub struct ConfigTokenStore {
    config: Arc<Config>,
    coding_key: String,
    /// Explicit encryption key; the machine key is used when absent.
    key: Option<[u8; 32]>,
}

impl ConfigTokenStore {
    pub fn new(config: Arc<Config>, coding_key: impl Into<String>) -> Self {
        Self {
            config,
            coding_key: coding_key.into(),
            key: None,
        }
    }

    /// Uses `remote.token_key` from the configuration as coding key.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let coding_key = config.get_remote_token_key()?;
        Ok(Self::new(config, coding_key))
    }

    pub fn with_key(mut self, key: [u8; 32]) -> Self {
        self.key = Some(key);
        self
    }

    fn path(&self) -> [&str; 3] {
        ["remote", "tokens", self.coding_key.as_str()]
    }

    fn encrypt(&self, value: &str) -> Result<String> {
        match &self.key {
            Some(key) => encryption::encrypt_secret_with_key(key, value),
            None => encryption::encrypt_secret(value),
        }
    }

    fn decrypt(&self, value: &str) -> Result<String> {
        match &self.key {
            Some(key) => encryption::get_secret_with_key(key, value),
            None => encryption::get_secret(value),
        }
    }
}

impl TokenStore for ConfigTokenStore {
    fn coding_key(&self) -> &str {
        &self.coding_key
    }

    fn get(&self) -> Result<String, StoreError> {
        match self.config.get_value(&self.path()) {
            Ok(Value::String(s)) if !s.is_empty() => self
                .decrypt(&s)
                .map_err(|e| StoreError::Backend(e.to_string())),
            Ok(_) | Err(_) => Err(StoreError::NotFound(self.coding_key.clone())),
        }
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        let stored = match self.encrypt(value) {
            Ok(encrypted) => encrypted,
            Err(e) => {
                // Pas d'identifiant machine : on garde le token en clair
                warn!("Failed to encrypt access token, storing it in clear: {}", e);
                value.to_string()
            }
        };
        self.config
            .set_value(&self.path(), Value::String(stored))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn delete(&self) -> Result<(), StoreError> {
        self.config
            .remove_value(&self.path())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
