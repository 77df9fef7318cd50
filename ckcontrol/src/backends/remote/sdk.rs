use async_trait::async_trait;
use tokio::sync::mpsc;

use super::session::AccessToken;
use crate::errors::ControlError;
use crate::model::RemotePlayerState;

/// Out-of-process control SDK of the streaming app.
///
/// `connect` and `disconnect` only start the operation: completion is
/// reported later as a [`RemoteEvent`] pushed into the channel created with
/// [`remote_event_channel`].
#[async_trait]
pub trait RemoteSdk: Send + Sync {
    async fn connect(&self, token: &AccessToken) -> Result<(), ControlError>;

    async fn disconnect(&self) -> Result<(), ControlError>;

    /// Hands off to the streaming app for authorization, then plays `uri`.
    /// An empty URI resumes the user's last item.
    async fn authorize_and_play(&self, uri: &str) -> Result<(), ControlError>;

    /// `Ok(None)` when the reply carried no usable player state.
    async fn player_state(&self) -> Result<Option<RemotePlayerState>, ControlError>;

    async fn resume(&self) -> Result<(), ControlError>;

    async fn pause(&self) -> Result<(), ControlError>;

    async fn skip_to_next(&self) -> Result<(), ControlError>;

    async fn skip_to_previous(&self) -> Result<(), ControlError>;
}

/// Delegate callbacks of the remote SDK.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteEvent {
    ConnectionEstablished,
    ConnectionFailed { error: Option<String> },
    Disconnected { error: Option<String> },
    PlayerStateChanged(RemotePlayerState),
}

pub type RemoteEventSender = mpsc::UnboundedSender<RemoteEvent>;
pub type RemoteEventReceiver = mpsc::UnboundedReceiver<RemoteEvent>;

/// Channel an SDK implementation pushes its callbacks into. The receiver goes
/// to [`crate::ControlService::spawn`].
pub fn remote_event_channel() -> (RemoteEventSender, RemoteEventReceiver) {
    mpsc::unbounded_channel()
}
