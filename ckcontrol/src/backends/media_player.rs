// ckcontrol/src/backends/media_player.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::capabilities::PlaybackController;
use crate::errors::ControlError;
use crate::model::BackendSelection;
use crate::services::MusicPlayer;

/// First-party system music player.
pub struct MediaPlayerController {
    player: Arc<dyn MusicPlayer>,
    is_playing: bool,
}

impl MediaPlayerController {
    pub fn new(player: Arc<dyn MusicPlayer>) -> Self {
        let is_playing = player.is_available() && player.playback_state().is_playing();
        Self { player, is_playing }
    }

    fn ensure_available(&self, operation: &str) -> bool {
        if self.player.is_available() {
            true
        } else {
            warn!(operation, "Media player unavailable, ignoring command");
            false
        }
    }
}

#[async_trait]
impl PlaybackController for MediaPlayerController {
    fn kind(&self) -> BackendSelection {
        BackendSelection::MediaPlayer
    }

    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn refresh_is_playing(&mut self) {
        self.is_playing = self.player.is_available() && self.player.playback_state().is_playing();
    }

    async fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        if !self.ensure_available("toggle_play_pause") {
            return Ok(());
        }

        let state = self.player.playback_state();
        debug!(?state, "Toggling media player");
        let result = if state.is_playing() {
            self.player.pause()
        } else {
            self.player.play()
        };
        self.refresh_is_playing();
        result
    }

    async fn skip_to_next(&mut self) -> Result<(), ControlError> {
        if !self.ensure_available("skip_to_next") {
            return Ok(());
        }
        self.player.skip_to_next_item()
    }

    async fn skip_to_previous(&mut self) -> Result<(), ControlError> {
        if !self.ensure_available("skip_to_previous") {
            return Ok(());
        }
        self.player.skip_to_previous_item()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::MusicPlaybackState;

    struct FakePlayer {
        state: Mutex<MusicPlaybackState>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakePlayer {
        fn new(state: MusicPlaybackState) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl MusicPlayer for FakePlayer {
        fn playback_state(&self) -> MusicPlaybackState {
            *self.state.lock().unwrap()
        }

        fn play(&self) -> Result<(), ControlError> {
            self.calls.lock().unwrap().push("play");
            *self.state.lock().unwrap() = MusicPlaybackState::Playing;
            Ok(())
        }

        fn pause(&self) -> Result<(), ControlError> {
            self.calls.lock().unwrap().push("pause");
            *self.state.lock().unwrap() = MusicPlaybackState::Paused;
            Ok(())
        }

        fn skip_to_next_item(&self) -> Result<(), ControlError> {
            self.calls.lock().unwrap().push("next");
            Ok(())
        }

        fn skip_to_previous_item(&self) -> Result<(), ControlError> {
            self.calls.lock().unwrap().push("previous");
            Err(ControlError::MediaPlayer("queue is empty".into()))
        }
    }

    #[tokio::test]
    async fn test_toggle_follows_player_state() {
        let player = FakePlayer::new(MusicPlaybackState::SeekingForward);
        let mut controller = MediaPlayerController::new(player.clone());
        assert!(controller.is_playing());

        controller.toggle_play_pause().await.unwrap();
        assert!(!controller.is_playing());
        controller.toggle_play_pause().await.unwrap();
        assert!(controller.is_playing());

        assert_eq!(*player.calls.lock().unwrap(), vec!["pause", "play"]);
    }

    #[tokio::test]
    async fn test_skip_errors_are_reported() {
        let player = FakePlayer::new(MusicPlaybackState::Stopped);
        let mut controller = MediaPlayerController::new(player.clone());

        controller.skip_to_next().await.unwrap();
        assert!(controller.skip_to_previous().await.is_err());
        assert_eq!(*player.calls.lock().unwrap(), vec!["next", "previous"]);
    }
}
