// ckcontrol/src/backends/local_audio.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::capabilities::PlaybackController;
use crate::errors::ControlError;
use crate::model::BackendSelection;
use crate::services::AudioSession;

/// Ambient audio session of the device.
///
/// There is no track and no session lifecycle: toggling flips our session
/// between active (silencing the other apps) and inactive (letting them
/// resume).
pub struct LocalAudioController {
    session: Arc<dyn AudioSession>,
    is_playing: bool,
}

impl LocalAudioController {
    pub fn new(session: Arc<dyn AudioSession>) -> Self {
        let is_playing = session.is_available() && session.is_other_audio_playing();
        Self {
            session,
            is_playing,
        }
    }
}

#[async_trait]
impl PlaybackController for LocalAudioController {
    fn kind(&self) -> BackendSelection {
        BackendSelection::LocalAudio
    }

    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn refresh_is_playing(&mut self) {
        self.is_playing = self.session.is_available() && self.session.is_other_audio_playing();
    }

    async fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        if !self.session.is_available() {
            warn!("Audio session unavailable, ignoring play/pause");
            return Ok(());
        }

        // Quelqu'un d'autre joue : on active notre session pour l'interrompre,
        // sinon on la libère pour que les autres reprennent.
        let activate = self.session.is_other_audio_playing();
        debug!(activate, "Toggling ambient audio session");
        let result = self.session.set_active(activate);
        self.refresh_is_playing();
        result
    }

    async fn skip_to_next(&mut self) -> Result<(), ControlError> {
        Err(ControlError::operation_not_supported(
            "skip_to_next",
            self.kind().as_str(),
        ))
    }

    async fn skip_to_previous(&mut self) -> Result<(), ControlError> {
        Err(ControlError::operation_not_supported(
            "skip_to_previous",
            self.kind().as_str(),
        ))
    }
}
