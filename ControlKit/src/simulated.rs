//! Services d'appareil simulés pour la démo console
//!
//! Tout est en mémoire. Le SDK distant répond de façon asynchrone par le
//! canal de délégué, comme le ferait l'application de streaming.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ckcontrol::{
    AccessToken, AudioSession, ControlError, DeviceServices, Flashlight, Haptics, MusicPlayer,
    MusicPlaybackState, RemoteEvent, RemoteEventSender, RemotePlayerState, RemoteSdk,
    SystemVolume,
};
use tracing::info;

/// Latence simulée des réponses du SDK distant.
const SDK_LATENCY: Duration = Duration::from_millis(150);

pub fn device_services(delegate: RemoteEventSender) -> DeviceServices {
    DeviceServices::new(
        Arc::new(SimulatedAudioSession::default()),
        Arc::new(SimulatedMusicPlayer::default()),
        Arc::new(SimulatedVolume::new(0.5)),
        Arc::new(SimulatedRemoteSdk::new(delegate)),
    )
    .with_haptics(Arc::new(SimulatedHaptics))
    .with_flashlight(Arc::new(SimulatedFlashlight::default()))
}

#[derive(Default)]
struct SimulatedAudioSession {
    active: AtomicBool,
}

impl AudioSession for SimulatedAudioSession {
    fn is_other_audio_playing(&self) -> bool {
        // Une autre app joue tant que notre session est inactive
        !self.active.load(Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) -> Result<(), ControlError> {
        info!(active, "[sim] audio session");
        self.active.store(active, Ordering::SeqCst);
        Ok(())
    }
}

struct SimulatedMusicPlayer {
    state: Mutex<MusicPlaybackState>,
    track: Mutex<usize>,
}

impl Default for SimulatedMusicPlayer {
    fn default() -> Self {
        Self {
            state: Mutex::new(MusicPlaybackState::Stopped),
            track: Mutex::new(0),
        }
    }
}

impl SimulatedMusicPlayer {
    fn set_state(&self, state: MusicPlaybackState) -> Result<(), ControlError> {
        *self
            .state
            .lock()
            .map_err(|e| ControlError::MediaPlayer(e.to_string()))? = state;
        info!(?state, "[sim] media player");
        Ok(())
    }

    fn move_track(&self, forward: bool) -> Result<(), ControlError> {
        let mut track = self
            .track
            .lock()
            .map_err(|e| ControlError::MediaPlayer(e.to_string()))?;
        *track = if forward {
            track.saturating_add(1)
        } else {
            track.saturating_sub(1)
        };
        info!(track = *track, "[sim] media player queue");
        Ok(())
    }
}

impl MusicPlayer for SimulatedMusicPlayer {
    fn playback_state(&self) -> MusicPlaybackState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(MusicPlaybackState::Stopped)
    }

    fn play(&self) -> Result<(), ControlError> {
        self.set_state(MusicPlaybackState::Playing)
    }

    fn pause(&self) -> Result<(), ControlError> {
        self.set_state(MusicPlaybackState::Paused)
    }

    fn skip_to_next_item(&self) -> Result<(), ControlError> {
        self.move_track(true)
    }

    fn skip_to_previous_item(&self) -> Result<(), ControlError> {
        self.move_track(false)
    }
}

struct SimulatedVolume {
    level: Mutex<f32>,
}

impl SimulatedVolume {
    fn new(level: f32) -> Self {
        Self {
            level: Mutex::new(level),
        }
    }
}

impl SystemVolume for SimulatedVolume {
    fn output_level(&self) -> Option<f32> {
        self.level.lock().ok().map(|l| *l)
    }

    fn set_output_level(&self, level: f32) -> Result<(), ControlError> {
        *self
            .level
            .lock()
            .map_err(|e| ControlError::SystemVolume(e.to_string()))? = level;
        Ok(())
    }
}

struct SimulatedHaptics;

impl Haptics for SimulatedHaptics {
    fn impact(&self) {
        info!("[sim] bzzt");
    }
}

#[derive(Default)]
struct SimulatedFlashlight {
    on: AtomicBool,
}

impl Flashlight for SimulatedFlashlight {
    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn set_on(&self, on: bool) -> Result<(), ControlError> {
        info!(on, "[sim] torch");
        self.on.store(on, Ordering::SeqCst);
        Ok(())
    }
}

struct SimulatedRemoteSdk {
    delegate: RemoteEventSender,
    connected: Arc<AtomicBool>,
    player: Arc<Mutex<RemotePlayerState>>,
}

impl SimulatedRemoteSdk {
    fn new(delegate: RemoteEventSender) -> Self {
        Self {
            delegate,
            connected: Arc::new(AtomicBool::new(false)),
            player: Arc::new(Mutex::new(RemotePlayerState {
                is_paused: true,
                track_uri: Some("remote:track:1".into()),
                track_name: Some("Simulated track".into()),
                artist_name: Some("ControlKit".into()),
                playback_position_ms: 0,
            })),
        }
    }

    fn ensure_connected(&self) -> Result<(), ControlError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ControlError::remote_sdk("not connected"))
        }
    }

    /// Met l'état du lecteur à jour puis notifie le délégué après la latence.
    fn update_player(&self, paused: bool) -> Result<(), ControlError> {
        self.ensure_connected()?;
        let state = {
            let mut player = self
                .player
                .lock()
                .map_err(|e| ControlError::remote_sdk(e.to_string()))?;
            player.is_paused = paused;
            player.clone()
        };
        self.notify_later(RemoteEvent::PlayerStateChanged(state));
        Ok(())
    }

    fn notify_later(&self, event: RemoteEvent) {
        let delegate = self.delegate.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SDK_LATENCY).await;
            let _ = delegate.send(event);
        });
    }
}

#[async_trait]
impl RemoteSdk for SimulatedRemoteSdk {
    async fn connect(&self, token: &AccessToken) -> Result<(), ControlError> {
        info!(token = %token, "[sim] remote connecting");
        let connected = self.connected.clone();
        let delegate = self.delegate.clone();
        let player = self.player.lock().ok().map(|p| p.clone());
        tokio::spawn(async move {
            tokio::time::sleep(SDK_LATENCY).await;
            connected.store(true, Ordering::SeqCst);
            let _ = delegate.send(RemoteEvent::ConnectionEstablished);
            if let Some(player) = player {
                let _ = delegate.send(RemoteEvent::PlayerStateChanged(player));
            }
        });
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ControlError> {
        info!("[sim] remote disconnecting");
        self.connected.store(false, Ordering::SeqCst);
        self.notify_later(RemoteEvent::Disconnected { error: None });
        Ok(())
    }

    async fn authorize_and_play(&self, uri: &str) -> Result<(), ControlError> {
        info!(
            uri,
            "[sim] the streaming app would open now; paste its callback with: redirect controlkit://callback#access_token=<token>"
        );
        Ok(())
    }

    async fn player_state(&self) -> Result<Option<RemotePlayerState>, ControlError> {
        self.ensure_connected()?;
        tokio::time::sleep(SDK_LATENCY).await;
        Ok(self.player.lock().ok().map(|p| p.clone()))
    }

    async fn resume(&self) -> Result<(), ControlError> {
        self.update_player(false)
    }

    async fn pause(&self) -> Result<(), ControlError> {
        self.update_player(true)
    }

    async fn skip_to_next(&self) -> Result<(), ControlError> {
        self.ensure_connected()?;
        info!("[sim] remote next track");
        Ok(())
    }

    async fn skip_to_previous(&self) -> Result<(), ControlError> {
        self.ensure_connected()?;
        info!("[sim] remote previous track");
        Ok(())
    }
}
