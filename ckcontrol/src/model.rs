use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ControlError;

/// Backend the playback commands are routed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendSelection {
    /// First-party media player (system music player).
    MediaPlayer,
    /// Third-party streaming app driven through its remote SDK.
    RemoteStreaming,
    /// Ambient audio session of the device. Has no track concept.
    #[default]
    LocalAudio,
}

impl BackendSelection {
    pub const ALL: [BackendSelection; 3] = [
        BackendSelection::MediaPlayer,
        BackendSelection::RemoteStreaming,
        BackendSelection::LocalAudio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendSelection::MediaPlayer => "media_player",
            BackendSelection::RemoteStreaming => "remote_streaming",
            BackendSelection::LocalAudio => "local_audio",
        }
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendSelection {
    type Err = ControlError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "media_player" | "mediaplayer" | "music" => Ok(BackendSelection::MediaPlayer),
            "remote_streaming" | "remote" => Ok(BackendSelection::RemoteStreaming),
            "local_audio" | "local" | "audio" => Ok(BackendSelection::LocalAudio),
            other => Err(ControlError::InvalidConfig(format!(
                "unknown backend selection '{other}'"
            ))),
        }
    }
}

/// Connection state of the remote streaming session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback state reported by the first-party media player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicPlaybackState {
    Stopped,
    Playing,
    Paused,
    Interrupted,
    SeekingForward,
    SeekingBackward,
}

impl MusicPlaybackState {
    /// Seeking counts as playing: the player resumes once the seek ends.
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            MusicPlaybackState::Playing
                | MusicPlaybackState::SeekingForward
                | MusicPlaybackState::SeekingBackward
        )
    }
}

/// Player state object delivered by the remote SDK.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePlayerState {
    pub is_paused: bool,
    pub track_uri: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub playback_position_ms: u64,
}

impl RemotePlayerState {
    pub fn paused() -> Self {
        Self {
            is_paused: true,
            ..Default::default()
        }
    }

    pub fn playing() -> Self {
        Self::default()
    }
}

/// Published state changes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControlEvent {
    SelectionChanged {
        selection: BackendSelection,
    },
    AudioPlayingChanged {
        playing: bool,
    },
    BackendPlayingChanged {
        backend: BackendSelection,
        playing: bool,
    },
    VolumeChanged {
        volume: f32,
    },
    MuteChanged {
        muted: bool,
    },
    SessionStateChanged {
        state: SessionState,
    },
}

/// Consolidated view of everything the controllers publish.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub selection: BackendSelection,
    pub is_audio_playing: bool,
    pub media_player_playing: bool,
    pub remote_playing: bool,
    pub volume: f32,
    pub is_muted: bool,
    pub remote_session: SessionState,
    pub has_access_token: bool,
    pub flashlight_on: bool,
}
