//! # ckcontrol
//!
//! Unified playback and volume control over heterogeneous backends: the
//! device's ambient audio session, the first-party media player and a
//! third-party streaming app reached through its remote SDK.
//!
//! - [`PlaybackController`] is the transport contract every backend adapter
//!   implements.
//! - [`SystemController`] owns the backend selection, routes commands through
//!   [`PlaybackRoute`] and republishes consolidated state as
//!   [`ControlEvent`]s.
//! - [`VolumeController`] couples volume and mute through the device output
//!   level.
//! - [`RemoteController`] owns the remote session and its authorization
//!   hand-off.
//! - [`ControlService`] runs a controller on one tokio task and hands out
//!   [`ControlHandle`]s.
//!
//! Platform services are injected through [`DeviceServices`].

pub mod backends;
pub mod capabilities;
pub mod errors;
pub mod events;
pub mod model;
pub mod routing;
pub mod service;
pub mod services;
pub mod system_controller;
pub mod token_store;
pub mod volume;

// Extension ckconfig (optionnelle)
#[cfg(feature = "ckconfig")]
pub mod config_ext;

pub use backends::remote::{
    ACCESS_TOKEN_KEY, AccessToken, RemoteConfig, RemoteController, RemoteEvent,
    RemoteEventReceiver, RemoteEventSender, RemoteLogLevel, RemoteSdk, RemoteSession,
    remote_event_channel,
};
pub use backends::{LocalAudioController, MediaPlayerController};
pub use capabilities::PlaybackController;
pub use errors::ControlError;
pub use events::ControlEventBus;
pub use model::{
    BackendSelection, ControlEvent, MusicPlaybackState, RemotePlayerState, SessionState,
    SystemSnapshot,
};
pub use routing::PlaybackRoute;
pub use service::{ControlCommand, ControlHandle, ControlService, ServiceHandle};
pub use services::{AudioSession, DeviceServices, Flashlight, Haptics, MusicPlayer, SystemVolume};
pub use system_controller::{ControllerSettings, SystemController};
pub use token_store::{MemoryTokenStore, StoreError, TokenStore};
pub use volume::{DEFAULT_VOLUME_STEP, UnitLevel, VolumeController};

#[cfg(feature = "ckconfig")]
pub use config_ext::{ConfigTokenStore, ControlConfigExt};
