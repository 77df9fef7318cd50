//! Device services the controllers drive.
//!
//! These are the platform collaborators (audio session, system music player,
//! output volume, haptics, torch). They are injected through
//! [`DeviceServices`] instead of being reached as process-wide singletons, so
//! a host application, a simulator or a test can provide its own.

use std::fmt;
use std::sync::Arc;

use crate::backends::remote::RemoteSdk;
use crate::errors::ControlError;
use crate::model::MusicPlaybackState;

/// Ambient audio session shared with the other apps of the device.
pub trait AudioSession: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    /// True while another app plays audio that should silence ours.
    fn is_other_audio_playing(&self) -> bool;

    /// Activates (interrupting other apps) or deactivates (notifying them so
    /// they resume) our session.
    fn set_active(&self, active: bool) -> Result<(), ControlError>;
}

/// First-party system music player.
pub trait MusicPlayer: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    fn playback_state(&self) -> MusicPlaybackState;

    fn play(&self) -> Result<(), ControlError>;

    fn pause(&self) -> Result<(), ControlError>;

    fn skip_to_next_item(&self) -> Result<(), ControlError>;

    fn skip_to_previous_item(&self) -> Result<(), ControlError>;
}

/// Device output level, the authoritative source for volume and mute.
pub trait SystemVolume: Send + Sync {
    /// Current level in `[0, 1]`, `None` when the volume control is unavailable.
    fn output_level(&self) -> Option<f32>;

    fn set_output_level(&self, level: f32) -> Result<(), ControlError>;
}

/// Haptic feedback engine.
pub trait Haptics: Send + Sync {
    /// Plays a soft impact.
    fn impact(&self);
}

/// Device torch.
pub trait Flashlight: Send + Sync {
    fn is_on(&self) -> bool;

    fn set_on(&self, on: bool) -> Result<(), ControlError>;
}

/// Every service a [`crate::SystemController`] needs, handed over at
/// construction.
#[derive(Clone)]
pub struct DeviceServices {
    pub audio_session: Arc<dyn AudioSession>,
    pub music_player: Arc<dyn MusicPlayer>,
    pub system_volume: Arc<dyn SystemVolume>,
    pub remote_sdk: Arc<dyn RemoteSdk>,
    pub haptics: Option<Arc<dyn Haptics>>,
    pub flashlight: Option<Arc<dyn Flashlight>>,
}

impl DeviceServices {
    pub fn new(
        audio_session: Arc<dyn AudioSession>,
        music_player: Arc<dyn MusicPlayer>,
        system_volume: Arc<dyn SystemVolume>,
        remote_sdk: Arc<dyn RemoteSdk>,
    ) -> Self {
        Self {
            audio_session,
            music_player,
            system_volume,
            remote_sdk,
            haptics: None,
            flashlight: None,
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn with_flashlight(mut self, flashlight: Arc<dyn Flashlight>) -> Self {
        self.flashlight = Some(flashlight);
        self
    }
}

impl fmt::Debug for DeviceServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceServices")
            .field("haptics", &self.haptics.is_some())
            .field("flashlight", &self.flashlight.is_some())
            .finish_non_exhaustive()
    }
}
