use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::config::RemoteConfig;
use super::redirect::parse_access_token;
use super::sdk::{RemoteEvent, RemoteSdk};
use super::session::{AccessToken, RemoteSession};
use crate::capabilities::PlaybackController;
use crate::errors::ControlError;
use crate::events::ControlEventBus;
use crate::model::{BackendSelection, ControlEvent, SessionState};
use crate::token_store::{StoreError, TokenStore};

/// Upper bound on the player-state round trip of a remote play/pause.
pub const DEFAULT_STATE_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter over the remote SDK.
///
/// Owns the session. Nothing here fails loudly: missing preconditions are
/// warnings, SDK failures are logged, persistence failures never roll back
/// the in-memory token.
pub struct RemoteController {
    sdk: Arc<dyn RemoteSdk>,
    config: RemoteConfig,
    token_store: Option<Arc<dyn TokenStore>>,
    session: RemoteSession,
    is_playing: bool,
    state_query_timeout: Duration,
    events: ControlEventBus,
}

impl RemoteController {
    /// Builds the adapter and seeds the session token from `token_store`.
    ///
    /// Does not connect; see [`RemoteController::start`].
    pub fn new(
        sdk: Arc<dyn RemoteSdk>,
        config: RemoteConfig,
        token_store: Option<Arc<dyn TokenStore>>,
        events: ControlEventBus,
    ) -> Self {
        let access_token = token_store.as_deref().and_then(load_token);
        Self {
            sdk,
            config,
            token_store,
            session: RemoteSession::new(access_token),
            is_playing: false,
            state_query_timeout: DEFAULT_STATE_QUERY_TIMEOUT,
            events,
        }
    }

    pub fn with_state_query_timeout(mut self, timeout: Duration) -> Self {
        self.state_query_timeout = timeout;
        self
    }

    /// Connects right away when `auto_connect` is set and the configuration
    /// is a real registration.
    pub async fn start(&mut self, auto_connect: bool) {
        if !auto_connect {
            debug!("Remote auto-connect disabled");
            return;
        }
        if self.config.is_empty() {
            debug!("Remote configuration is empty, not connecting");
            return;
        }
        self.connect().await;
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn session(&self) -> &RemoteSession {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state
    }

    pub fn has_access_token(&self) -> bool {
        self.session.has_access_token()
    }

    /// Opens the SDK connection with the session token.
    ///
    /// Completion arrives later as a [`RemoteEvent`]. A pending attempt is
    /// re-issued with the current token.
    pub async fn connect(&mut self) {
        let Some(token) = self.session.access_token.clone() else {
            warn!("Attempting to connect to the remote app without first setting an access token");
            return;
        };

        match self.session.state {
            SessionState::Connected => {
                debug!("Remote session already connected, ignoring connect");
                return;
            }
            // Le SDK peut ne jamais rappeler : on relance la tentative
            SessionState::Connecting => {
                info!("Remote connection still pending, retrying");
            }
            SessionState::Disconnected => self.set_state(SessionState::Connecting),
        }

        if let Err(e) = self.sdk.connect(&token).await {
            error!("Remote connect failed: {}", e);
            self.set_state(SessionState::Disconnected);
        }
    }

    /// Hands off to the streaming app, resuming the user's last item.
    pub async fn authorize(&mut self) {
        self.authorize_and_play("").await;
    }

    /// Hands off to the streaming app, which calls back the redirect URL with
    /// a token and then plays `uri`.
    pub async fn authorize_and_play(&mut self, uri: &str) {
        info!(client_id = %self.config.client_id, redirect_url = %self.config.redirect_url, "Requesting remote authorization");
        if let Err(e) = self.sdk.authorize_and_play(uri).await {
            error!("Remote authorization hand-off failed: {}", e);
        }
    }

    /// Takes the token out of the authorization redirect, persists it and
    /// assigns it to the session.
    ///
    /// A redirect without a token leaves the current one untouched.
    pub fn set_access_token(&mut self, redirect_url: &str) {
        let token = match parse_access_token(redirect_url) {
            Ok(token) => token,
            Err(e) => {
                debug!("Keeping current access token: {}", e);
                return;
            }
        };

        match self.token_store.as_deref() {
            Some(store) => {
                if let Err(e) = store.save(token.expose()) {
                    warn!(key = store.coding_key(), "Failed to persist access token: {}", e);
                }
            }
            None => debug!("No token store, access token will not survive a restart"),
        }

        self.session.access_token = Some(token);
        info!("Remote access token set");
    }

    /// Closes the SDK connection and forgets the token, persisted copy
    /// included.
    pub async fn disconnect(&mut self) {
        if !self.session.is_connected() {
            warn!(state = %self.session.state, "Attempting to disconnect from the remote app but it is not connected");
            return;
        }

        if let Err(e) = self.sdk.disconnect().await {
            warn!("Remote disconnect reported an error: {}", e);
        }

        if let Some(store) = self.token_store.as_deref() {
            match store.delete() {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(e) => warn!(key = store.coding_key(), "Failed to delete access token: {}", e),
            }
        }

        self.session.clear();
        self.publish_state();
    }

    /// Applies one SDK delegate callback.
    pub fn handle_event(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::ConnectionEstablished => {
                info!("Remote connection established");
                self.set_state(SessionState::Connected);
            }
            RemoteEvent::ConnectionFailed { error } => {
                info!(
                    error = error.as_deref().unwrap_or("unknown"),
                    "Remote connection attempt failed"
                );
                self.set_state(SessionState::Disconnected);
            }
            RemoteEvent::Disconnected { error } => {
                info!(
                    error = error.as_deref().unwrap_or("none"),
                    "Remote app disconnected"
                );
                self.set_state(SessionState::Disconnected);
            }
            RemoteEvent::PlayerStateChanged(state) => {
                debug!(
                    paused = state.is_paused,
                    track = state.track_name.as_deref().unwrap_or(""),
                    "Remote player state changed"
                );
                self.is_playing = !state.is_paused;
            }
        }
    }

    fn ensure_connected(&self, operation: &str) -> bool {
        if self.session.is_connected() {
            true
        } else {
            warn!(operation, state = %self.session.state, "Remote app not connected, ignoring command");
            false
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.session.state != state {
            debug!(from = %self.session.state, to = %state, "Remote session state");
            self.session.state = state;
            self.publish_state();
        }
    }

    fn publish_state(&self) {
        self.events.broadcast(ControlEvent::SessionStateChanged {
            state: self.session.state,
        });
    }
}

fn load_token(store: &dyn TokenStore) -> Option<AccessToken> {
    match store.get() {
        Ok(value) => Some(AccessToken::new(value)),
        Err(StoreError::NotFound(key)) => {
            debug!(key = %key, "Access token not set");
            None
        }
        Err(e) => {
            warn!(key = store.coding_key(), "Failed to read access token: {}", e);
            None
        }
    }
}

#[async_trait]
impl PlaybackController for RemoteController {
    fn kind(&self) -> BackendSelection {
        BackendSelection::RemoteStreaming
    }

    fn is_playing(&self) -> bool {
        self.is_playing
    }

    async fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        if !self.ensure_connected("toggle_play_pause") {
            return Ok(());
        }

        let timeout_ms = self.state_query_timeout.as_millis() as u64;
        let state =
            match tokio::time::timeout(self.state_query_timeout, self.sdk.player_state()).await {
                Ok(Ok(Some(state))) => state,
                Ok(Ok(None)) => {
                    error!("Remote player state reply carried no state, issuing no command");
                    return Err(ControlError::player_state("missing player state"));
                }
                Ok(Err(e)) => {
                    error!("Failed to get remote player state: {}", e);
                    return Err(ControlError::player_state(e.to_string()));
                }
                Err(_) => {
                    error!(timeout_ms, "Remote player state query timed out, issuing no command");
                    return Err(ControlError::PlayerStateTimeout(timeout_ms));
                }
            };

        if state.is_paused {
            self.sdk.resume().await?;
            self.is_playing = true;
        } else {
            self.sdk.pause().await?;
            self.is_playing = false;
        }
        Ok(())
    }

    async fn skip_to_next(&mut self) -> Result<(), ControlError> {
        if !self.ensure_connected("skip_to_next") {
            return Ok(());
        }
        self.sdk.skip_to_next().await
    }

    async fn skip_to_previous(&mut self) -> Result<(), ControlError> {
        if !self.ensure_connected("skip_to_previous") {
            return Ok(());
        }
        self.sdk.skip_to_previous().await
    }
}
