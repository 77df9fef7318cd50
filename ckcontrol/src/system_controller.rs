//! Orchestrator over every playback backend and the volume manager.
//!
//! `SystemController` owns the backend selection, routes the transport
//! commands through [`PlaybackRoute`] and republishes the consolidated state
//! after each of them. It never surfaces an error: backend failures are
//! logged and the next target is still called.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::backends::remote::{
    DEFAULT_STATE_QUERY_TIMEOUT, RemoteConfig, RemoteController, RemoteEvent,
};
use crate::backends::{LocalAudioController, MediaPlayerController};
use crate::capabilities::PlaybackController;
use crate::events::ControlEventBus;
use crate::model::{BackendSelection, ControlEvent, SystemSnapshot};
use crate::routing::PlaybackRoute;
use crate::services::{DeviceServices, Flashlight, Haptics};
use crate::token_store::TokenStore;
use crate::volume::{DEFAULT_VOLUME_STEP, UnitLevel, VolumeController};

/// Construction-time settings of a [`SystemController`].
#[derive(Clone)]
pub struct ControllerSettings {
    pub remote_config: RemoteConfig,
    /// Where the remote access token is persisted. `None` keeps it in memory.
    pub token_store: Option<Arc<dyn TokenStore>>,
    /// Connect the remote backend at construction (ignored for an empty
    /// [`RemoteConfig`]).
    pub auto_connect: bool,
    pub volume_step: UnitLevel,
    pub state_query_timeout: Duration,
    pub default_selection: BackendSelection,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            remote_config: RemoteConfig::empty(),
            token_store: None,
            auto_connect: true,
            volume_step: DEFAULT_VOLUME_STEP,
            state_query_timeout: DEFAULT_STATE_QUERY_TIMEOUT,
            default_selection: BackendSelection::default(),
        }
    }
}

impl fmt::Debug for ControllerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSettings")
            .field("remote_config", &self.remote_config)
            .field("token_store", &self.token_store.as_ref().map(|s| s.coding_key()))
            .field("auto_connect", &self.auto_connect)
            .field("volume_step", &self.volume_step)
            .field("state_query_timeout", &self.state_query_timeout)
            .field("default_selection", &self.default_selection)
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
enum PlaybackCommand {
    TogglePlayPause,
    SkipToNext,
    SkipToPrevious,
}

impl PlaybackCommand {
    fn as_str(&self) -> &'static str {
        match self {
            PlaybackCommand::TogglePlayPause => "toggle_play_pause",
            PlaybackCommand::SkipToNext => "skip_to_next",
            PlaybackCommand::SkipToPrevious => "skip_to_previous",
        }
    }
}

pub struct SystemController {
    selection: BackendSelection,
    is_audio_playing: bool,
    /// Last published `is_playing` per backend, in [`BackendSelection::ALL`] order.
    backend_playing: [bool; 3],
    local_audio: LocalAudioController,
    media_player: MediaPlayerController,
    remote: RemoteController,
    volume: VolumeController,
    haptics: Option<Arc<dyn Haptics>>,
    flashlight: Option<Arc<dyn Flashlight>>,
    events: ControlEventBus,
}

impl SystemController {
    /// Builds every adapter over `services` and auto-connects the remote
    /// backend when `settings` ask for it.
    pub async fn new(services: DeviceServices, settings: ControllerSettings) -> Self {
        let events = ControlEventBus::new();

        let local_audio = LocalAudioController::new(services.audio_session.clone());
        let media_player = MediaPlayerController::new(services.music_player.clone());
        let mut remote = RemoteController::new(
            services.remote_sdk.clone(),
            settings.remote_config.clone(),
            settings.token_store.clone(),
            events.clone(),
        )
        .with_state_query_timeout(settings.state_query_timeout);
        let volume = VolumeController::new(services.system_volume.clone(), events.clone())
            .with_step(settings.volume_step);

        remote.start(settings.auto_connect).await;

        let mut controller = Self {
            selection: settings.default_selection,
            is_audio_playing: false,
            backend_playing: [false; 3],
            local_audio,
            media_player,
            remote,
            volume,
            haptics: services.haptics.clone(),
            flashlight: services.flashlight.clone(),
            events,
        };
        controller.publish_playing_state();

        info!(
            selection = %controller.selection,
            remote_session = %controller.remote.session_state(),
            "System controller ready"
        );
        controller
    }

    pub fn events(&self) -> &ControlEventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<ControlEvent> {
        self.events.subscribe()
    }

    pub fn selection(&self) -> BackendSelection {
        self.selection
    }

    pub fn is_audio_playing(&self) -> bool {
        self.is_audio_playing
    }

    pub fn local_audio(&self) -> &LocalAudioController {
        &self.local_audio
    }

    pub fn media_player(&self) -> &MediaPlayerController {
        &self.media_player
    }

    pub fn remote(&self) -> &RemoteController {
        &self.remote
    }

    pub fn volume_controller(&self) -> &VolumeController {
        &self.volume
    }

    // ---- Selection & transport ---------------------------------------------

    pub fn set_selection(&mut self, selection: BackendSelection) {
        if self.selection != selection {
            info!(from = %self.selection, to = %selection, "Playback selection changed");
            self.selection = selection;
            self.events
                .broadcast(ControlEvent::SelectionChanged { selection });
        }
        self.publish_playing_state();
    }

    pub async fn toggle_play_pause(&mut self) {
        let route = PlaybackRoute::for_selection(self.selection);
        self.dispatch(route.toggle_target, PlaybackCommand::TogglePlayPause)
            .await;
        self.publish_playing_state();
    }

    pub async fn skip_to_next(&mut self) {
        let route = PlaybackRoute::for_selection(self.selection);
        for target in route.skip_targets {
            self.dispatch(*target, PlaybackCommand::SkipToNext).await;
        }
        self.publish_playing_state();
    }

    pub async fn skip_to_previous(&mut self) {
        let route = PlaybackRoute::for_selection(self.selection);
        for target in route.skip_targets {
            self.dispatch(*target, PlaybackCommand::SkipToPrevious).await;
        }
        self.publish_playing_state();
    }

    fn backend(&self, kind: BackendSelection) -> &dyn PlaybackController {
        match kind {
            BackendSelection::MediaPlayer => &self.media_player,
            BackendSelection::RemoteStreaming => &self.remote,
            BackendSelection::LocalAudio => &self.local_audio,
        }
    }

    fn backend_mut(&mut self, kind: BackendSelection) -> &mut dyn PlaybackController {
        match kind {
            BackendSelection::MediaPlayer => &mut self.media_player,
            BackendSelection::RemoteStreaming => &mut self.remote,
            BackendSelection::LocalAudio => &mut self.local_audio,
        }
    }

    async fn dispatch(&mut self, target: BackendSelection, command: PlaybackCommand) {
        debug!(backend = %target, command = command.as_str(), "Dispatching playback command");
        let backend = self.backend_mut(target);
        let result = match command {
            PlaybackCommand::TogglePlayPause => backend.toggle_play_pause().await,
            PlaybackCommand::SkipToNext => backend.skip_to_next().await,
            PlaybackCommand::SkipToPrevious => backend.skip_to_previous().await,
        };
        if let Err(e) = result {
            warn!(backend = %target, command = command.as_str(), "Playback command failed: {}", e);
        }
    }

    /// Re-reads every backend, then derives `is_audio_playing` from the
    /// selection's source. Publishes whatever changed.
    fn publish_playing_state(&mut self) {
        self.local_audio.refresh_is_playing();
        self.media_player.refresh_is_playing();

        for (index, kind) in BackendSelection::ALL.iter().enumerate() {
            let playing = self.backend(*kind).is_playing();
            if self.backend_playing[index] != playing {
                self.backend_playing[index] = playing;
                self.events.broadcast(ControlEvent::BackendPlayingChanged {
                    backend: *kind,
                    playing,
                });
            }
        }

        let source = PlaybackRoute::for_selection(self.selection).playing_source;
        let playing = self.backend(source).is_playing();
        if self.is_audio_playing != playing {
            self.is_audio_playing = playing;
            self.events
                .broadcast(ControlEvent::AudioPlayingChanged { playing });
        }
    }

    // ---- Volume ------------------------------------------------------------

    pub fn volume(&self) -> f32 {
        self.volume.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn set_volume(&mut self, value: f32) {
        self.volume.set_volume(value);
    }

    pub fn increase_volume(&mut self, amount: f32) {
        self.volume.increase(amount);
    }

    pub fn decrease_volume(&mut self, amount: f32) {
        self.volume.decrease(amount);
    }

    pub fn increase_volume_step(&mut self) {
        self.volume.increase_step();
    }

    pub fn decrease_volume_step(&mut self) {
        self.volume.decrease_step();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
    }

    // ---- Remote session ----------------------------------------------------

    pub async fn authorize(&mut self) {
        self.remote.authorize().await;
    }

    pub async fn authorize_and_play(&mut self, uri: &str) {
        self.remote.authorize_and_play(uri).await;
    }

    pub fn set_access_token(&mut self, redirect_url: &str) {
        self.remote.set_access_token(redirect_url);
    }

    pub async fn connect(&mut self) {
        self.remote.connect().await;
    }

    pub async fn disconnect(&mut self) {
        self.remote.disconnect().await;
    }

    /// Applies a remote SDK delegate callback and republishes.
    pub fn handle_remote_event(&mut self, event: RemoteEvent) {
        self.remote.handle_event(event);
        self.publish_playing_state();
    }

    // ---- Hardware ----------------------------------------------------------

    /// Soft haptic pulse.
    pub fn vibrate(&self) {
        match &self.haptics {
            Some(haptics) => haptics.impact(),
            None => info!("No haptics engine on this device"),
        }
    }

    /// Sets the torch to `on`, or flips it when `None`.
    pub fn toggle_flashlight(&self, on: Option<bool>) {
        let Some(flashlight) = &self.flashlight else {
            info!("No flashlight on this device");
            return;
        };
        let target = on.unwrap_or(!flashlight.is_on());
        if let Err(e) = flashlight.set_on(target) {
            warn!(on = target, "Failed to switch flashlight: {}", e);
        }
    }

    pub fn is_flashlight_on(&self) -> bool {
        self.flashlight.as_ref().is_some_and(|f| f.is_on())
    }

    // ---- State -------------------------------------------------------------

    /// Re-derives the published state from the device services.
    pub fn refresh(&mut self) {
        self.volume.refresh();
        self.publish_playing_state();
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            selection: self.selection,
            is_audio_playing: self.is_audio_playing,
            media_player_playing: self.media_player.is_playing(),
            remote_playing: self.remote.is_playing(),
            volume: self.volume.volume(),
            is_muted: self.volume.is_muted(),
            remote_session: self.remote.session_state(),
            has_access_token: self.remote.has_access_token(),
            flashlight_on: self.is_flashlight_on(),
        }
    }
}

impl fmt::Debug for SystemController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemController")
            .field("selection", &self.selection)
            .field("is_audio_playing", &self.is_audio_playing)
            .field("volume", &self.volume.volume())
            .field("is_muted", &self.volume.is_muted())
            .field("remote_session", &self.remote.session_state())
            .finish_non_exhaustive()
    }
}
