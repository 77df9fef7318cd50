// ckcontrol/src/capabilities.rs
use async_trait::async_trait;

use crate::errors::ControlError;
use crate::model::BackendSelection;

/// Minimal transport contract every playback backend implements.
///
/// Commands are fire-and-forget for the end caller: the state change they
/// cause is observed later through [`PlaybackController::is_playing`].
/// An unavailable device or session turns a command into a logged no-op and
/// `Ok(())`. An `Err` means the backend tried and failed; the orchestrator
/// logs it and moves on to the next target.
#[async_trait]
pub trait PlaybackController: Send {
    /// Which backend this adapter drives.
    fn kind(&self) -> BackendSelection;

    /// Last published playing flag.
    fn is_playing(&self) -> bool;

    /// Re-reads the playing flag from the underlying source, if the backend
    /// can be queried synchronously.
    fn refresh_is_playing(&mut self) {}

    /// Pauses when playing, resumes otherwise.
    async fn toggle_play_pause(&mut self) -> Result<(), ControlError>;

    async fn skip_to_next(&mut self) -> Result<(), ControlError>;

    async fn skip_to_previous(&mut self) -> Result<(), ControlError>;
}
