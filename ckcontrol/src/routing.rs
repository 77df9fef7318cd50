use crate::model::BackendSelection;

/// Where the orchestrator sends each command for one selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackRoute {
    pub toggle_target: BackendSelection,
    /// Called in order; a failing target does not stop the next one.
    pub skip_targets: &'static [BackendSelection],
    /// Backend whose `is_playing` becomes `is_audio_playing`.
    pub playing_source: BackendSelection,
}

const MEDIA_PLAYER_ROUTE: PlaybackRoute = PlaybackRoute {
    toggle_target: BackendSelection::MediaPlayer,
    skip_targets: &[BackendSelection::MediaPlayer],
    playing_source: BackendSelection::MediaPlayer,
};

const REMOTE_STREAMING_ROUTE: PlaybackRoute = PlaybackRoute {
    toggle_target: BackendSelection::RemoteStreaming,
    skip_targets: &[BackendSelection::RemoteStreaming],
    playing_source: BackendSelection::RemoteStreaming,
};

// L'audio ambiant n'a pas de piste : les sauts partent vers les deux autres.
const LOCAL_AUDIO_ROUTE: PlaybackRoute = PlaybackRoute {
    toggle_target: BackendSelection::LocalAudio,
    skip_targets: &[
        BackendSelection::MediaPlayer,
        BackendSelection::RemoteStreaming,
    ],
    playing_source: BackendSelection::LocalAudio,
};

impl PlaybackRoute {
    pub fn for_selection(selection: BackendSelection) -> PlaybackRoute {
        match selection {
            BackendSelection::MediaPlayer => MEDIA_PLAYER_ROUTE,
            BackendSelection::RemoteStreaming => REMOTE_STREAMING_ROUTE,
            BackendSelection::LocalAudio => LOCAL_AUDIO_ROUTE,
        }
    }
}
