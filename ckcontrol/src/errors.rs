use thiserror::Error;

use crate::token_store::StoreError;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Operation '{0}' is not supported by backend '{1}'")]
    OperationNotSupported(String, String),
    #[error("{0} is not available on this device")]
    DeviceUnavailable(String),
    #[error("Audio session error: {0}")]
    AudioSession(String),
    #[error("Media player error: {0}")]
    MediaPlayer(String),
    #[error("System volume error: {0}")]
    SystemVolume(String),
    #[error("Hardware error: {0}")]
    Hardware(String),
    #[error("Remote SDK error: {0}")]
    RemoteSdk(String),
    #[error("Remote player state query failed: {0}")]
    PlayerState(String),
    #[error("Remote player state query timed out after {0} ms")]
    PlayerStateTimeout(u64),
    #[error("Token store error: {0}")]
    TokenStore(#[from] StoreError),
    #[error("Invalid redirect URL: {0}")]
    RedirectParse(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Control service is not running")]
    ServiceStopped,
}

impl ControlError {
    pub fn operation_not_supported(operation: &str, backend: &str) -> Self {
        ControlError::OperationNotSupported(operation.to_string(), backend.to_string())
    }

    pub fn remote_sdk(message: impl Into<String>) -> Self {
        ControlError::RemoteSdk(message.into())
    }

    pub fn player_state(message: impl Into<String>) -> Self {
        ControlError::PlayerState(message.into())
    }
}
