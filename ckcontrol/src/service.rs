//! Serialized execution context for a [`SystemController`].
//!
//! One tokio task owns the controller and applies commands and remote SDK
//! callbacks one at a time. Callers only hold cheap [`ControlHandle`]s that
//! send messages, so no controller state is ever shared or locked.

use crossbeam_channel::Receiver;
use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backends::remote::{RemoteEvent, RemoteEventReceiver};
use crate::errors::ControlError;
use crate::events::ControlEventBus;
use crate::model::{BackendSelection, ControlEvent, SystemSnapshot};
use crate::system_controller::SystemController;

/// Everything a [`ControlHandle`] can ask of the service.
#[derive(Debug)]
pub enum ControlCommand {
    SetSelection(BackendSelection),
    TogglePlayPause,
    SkipToNext,
    SkipToPrevious,
    SetVolume(f32),
    IncreaseVolume(f32),
    DecreaseVolume(f32),
    IncreaseVolumeStep,
    DecreaseVolumeStep,
    SetMuted(bool),
    ToggleMute,
    Authorize,
    AuthorizeAndPlay(String),
    SetAccessToken(String),
    Connect,
    Disconnect,
    Vibrate,
    ToggleFlashlight(Option<bool>),
    Snapshot(oneshot::Sender<SystemSnapshot>),
}

impl ControlCommand {
    fn name(&self) -> &'static str {
        match self {
            ControlCommand::SetSelection(_) => "set_selection",
            ControlCommand::TogglePlayPause => "toggle_play_pause",
            ControlCommand::SkipToNext => "skip_to_next",
            ControlCommand::SkipToPrevious => "skip_to_previous",
            ControlCommand::SetVolume(_) => "set_volume",
            ControlCommand::IncreaseVolume(_) => "increase_volume",
            ControlCommand::DecreaseVolume(_) => "decrease_volume",
            ControlCommand::IncreaseVolumeStep => "increase_volume_step",
            ControlCommand::DecreaseVolumeStep => "decrease_volume_step",
            ControlCommand::SetMuted(_) => "set_muted",
            ControlCommand::ToggleMute => "toggle_mute",
            ControlCommand::Authorize => "authorize",
            ControlCommand::AuthorizeAndPlay(_) => "authorize_and_play",
            ControlCommand::SetAccessToken(_) => "set_access_token",
            ControlCommand::Connect => "connect",
            ControlCommand::Disconnect => "disconnect",
            ControlCommand::Vibrate => "vibrate",
            ControlCommand::ToggleFlashlight(_) => "toggle_flashlight",
            ControlCommand::Snapshot(_) => "snapshot",
        }
    }
}

/// Cloneable front door of a running [`ControlService`].
///
/// Command methods never fail: when the service is gone the command is
/// dropped with a warning.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    commands: mpsc::UnboundedSender<ControlCommand>,
    events: ControlEventBus,
}

impl ControlHandle {
    fn send(&self, command: ControlCommand) {
        let name = command.name();
        if self.commands.send(command).is_err() {
            warn!(command = name, "Control service stopped, dropping command");
        }
    }

    pub fn subscribe(&self) -> Receiver<ControlEvent> {
        self.events.subscribe()
    }

    pub fn set_selection(&self, selection: BackendSelection) {
        self.send(ControlCommand::SetSelection(selection));
    }

    pub fn toggle_play_pause(&self) {
        self.send(ControlCommand::TogglePlayPause);
    }

    pub fn skip_to_next(&self) {
        self.send(ControlCommand::SkipToNext);
    }

    pub fn skip_to_previous(&self) {
        self.send(ControlCommand::SkipToPrevious);
    }

    pub fn set_volume(&self, value: f32) {
        self.send(ControlCommand::SetVolume(value));
    }

    pub fn increase_volume(&self, amount: f32) {
        self.send(ControlCommand::IncreaseVolume(amount));
    }

    pub fn decrease_volume(&self, amount: f32) {
        self.send(ControlCommand::DecreaseVolume(amount));
    }

    pub fn increase_volume_step(&self) {
        self.send(ControlCommand::IncreaseVolumeStep);
    }

    pub fn decrease_volume_step(&self) {
        self.send(ControlCommand::DecreaseVolumeStep);
    }

    pub fn set_muted(&self, muted: bool) {
        self.send(ControlCommand::SetMuted(muted));
    }

    pub fn toggle_mute(&self) {
        self.send(ControlCommand::ToggleMute);
    }

    pub fn authorize(&self) {
        self.send(ControlCommand::Authorize);
    }

    pub fn authorize_and_play(&self, uri: impl Into<String>) {
        self.send(ControlCommand::AuthorizeAndPlay(uri.into()));
    }

    pub fn set_access_token(&self, redirect_url: impl Into<String>) {
        self.send(ControlCommand::SetAccessToken(redirect_url.into()));
    }

    pub fn connect(&self) {
        self.send(ControlCommand::Connect);
    }

    pub fn disconnect(&self) {
        self.send(ControlCommand::Disconnect);
    }

    pub fn vibrate(&self) {
        self.send(ControlCommand::Vibrate);
    }

    pub fn toggle_flashlight(&self, on: Option<bool>) {
        self.send(ControlCommand::ToggleFlashlight(on));
    }

    /// Refreshed consolidated state, once every command sent before it has
    /// been applied.
    pub async fn snapshot(&self) -> Result<SystemSnapshot, ControlError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(ControlCommand::Snapshot(reply_tx))
            .map_err(|_| ControlError::ServiceStopped)?;
        reply_rx.await.map_err(|_| ControlError::ServiceStopped)
    }
}

/// Owner side of a running [`ControlService`].
///
/// Dropping it detaches the service, which then runs until every
/// [`ControlHandle`] is gone.
pub struct ServiceHandle {
    join: JoinHandle<SystemController>,
    shutdown_tx: oneshot::Sender<()>,
}

impl ServiceHandle {
    /// Stops the loop and hands the controller back.
    pub async fn shutdown(self) -> Result<SystemController, tokio::task::JoinError> {
        let _ = self.shutdown_tx.send(());
        self.join.await
    }

    /// Waits for the loop to end on its own, once every [`ControlHandle`]
    /// has been dropped.
    pub async fn join(self) -> Result<SystemController, tokio::task::JoinError> {
        self.join.await
    }

    pub fn abort(self) {
        self.join.abort();
    }
}

pub struct ControlService {
    controller: SystemController,
    commands: mpsc::UnboundedReceiver<ControlCommand>,
    remote_events: RemoteEventReceiver,
}

impl ControlService {
    /// Moves `controller` into a background task.
    ///
    /// `remote_events` is the receiving end of
    /// [`crate::backends::remote::remote_event_channel`], whose sender went
    /// to the remote SDK.
    pub fn spawn(
        controller: SystemController,
        remote_events: RemoteEventReceiver,
    ) -> (ControlHandle, ServiceHandle) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let handle = ControlHandle {
            commands: commands_tx,
            events: controller.events().clone(),
        };

        let service = ControlService {
            controller,
            commands: commands_rx,
            remote_events,
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(service.run(shutdown_rx));

        (handle, ServiceHandle { join, shutdown_tx })
    }

    async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) -> SystemController {
        let mut remote_open = true;
        let mut shutdown_open = true;
        info!("Control service started");

        loop {
            select! {
                biased;
                requested = &mut shutdown_rx, if shutdown_open => {
                    if requested.is_ok() {
                        info!("Control service shutdown requested");
                        break;
                    }
                    // ServiceHandle lâché : le service vit tant qu'il reste des handles
                    debug!("Service handle dropped, running until control handles are gone");
                    shutdown_open = false;
                }
                event = self.remote_events.recv(), if remote_open => {
                    match event {
                        Some(event) => self.on_remote_event(event),
                        None => {
                            debug!("Remote event channel closed");
                            remote_open = false;
                        }
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.on_command(command).await,
                        None => {
                            info!("All control handles dropped; stopping control service");
                            break;
                        }
                    }
                }
            }
        }

        self.controller
    }

    fn on_remote_event(&mut self, event: RemoteEvent) {
        debug!(?event, "Remote event");
        self.controller.handle_remote_event(event);
    }

    async fn on_command(&mut self, command: ControlCommand) {
        debug!(command = command.name(), "Control command");
        let controller = &mut self.controller;
        match command {
            ControlCommand::SetSelection(selection) => controller.set_selection(selection),
            ControlCommand::TogglePlayPause => controller.toggle_play_pause().await,
            ControlCommand::SkipToNext => controller.skip_to_next().await,
            ControlCommand::SkipToPrevious => controller.skip_to_previous().await,
            ControlCommand::SetVolume(value) => controller.set_volume(value),
            ControlCommand::IncreaseVolume(amount) => controller.increase_volume(amount),
            ControlCommand::DecreaseVolume(amount) => controller.decrease_volume(amount),
            ControlCommand::IncreaseVolumeStep => controller.increase_volume_step(),
            ControlCommand::DecreaseVolumeStep => controller.decrease_volume_step(),
            ControlCommand::SetMuted(muted) => controller.set_muted(muted),
            ControlCommand::ToggleMute => controller.toggle_mute(),
            ControlCommand::Authorize => controller.authorize().await,
            ControlCommand::AuthorizeAndPlay(uri) => controller.authorize_and_play(&uri).await,
            ControlCommand::SetAccessToken(url) => controller.set_access_token(&url),
            ControlCommand::Connect => controller.connect().await,
            ControlCommand::Disconnect => controller.disconnect().await,
            ControlCommand::Vibrate => controller.vibrate(),
            ControlCommand::ToggleFlashlight(on) => controller.toggle_flashlight(on),
            ControlCommand::Snapshot(reply) => {
                controller.refresh();
                if reply.send(controller.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }
}
