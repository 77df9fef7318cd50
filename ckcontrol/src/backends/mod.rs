//! Playback backend adapters.
//!
//! Each adapter implements [`crate::PlaybackController`] over one device
//! service and owns only its own `is_playing` query result.

pub mod local_audio;
pub mod media_player;
pub mod remote;

pub use local_audio::LocalAudioController;
pub use media_player::MediaPlayerController;
pub use remote::{RemoteConfig, RemoteController, RemoteLogLevel, RemoteSession};
