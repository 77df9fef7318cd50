//! Commandes de la console de démonstration (une par ligne sur stdin)

use ckcontrol::{BackendSelection, ControlHandle};

pub const HELP: &str = "\
commands:
  select <media_player|remote_streaming|local_audio>
  play | next | prev
  vol <0..1> | up | down | mute | unmute
  authorize | redirect <url> | connect | disconnect
  vibrate | torch | status | help | quit";

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    Select(BackendSelection),
    Play,
    Next,
    Previous,
    Volume(f32),
    Up,
    Down,
    Mute,
    Unmute,
    Authorize,
    Redirect(String),
    Connect,
    Disconnect,
    Vibrate,
    Torch,
    Status,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let argument = words.next();

        let command = match (verb.to_ascii_lowercase().as_str(), argument) {
            ("select", Some(raw)) => {
                ConsoleCommand::Select(raw.parse().map_err(|e| format!("{e}"))?)
            }
            ("select", None) => return Err("select needs a backend".into()),
            ("play" | "pause" | "toggle", _) => ConsoleCommand::Play,
            ("next", _) => ConsoleCommand::Next,
            ("prev" | "previous", _) => ConsoleCommand::Previous,
            ("vol" | "volume", Some(raw)) => ConsoleCommand::Volume(
                raw.parse::<f32>()
                    .map_err(|e| format!("invalid volume '{raw}': {e}"))?,
            ),
            ("vol" | "volume", None) => return Err("vol needs a value".into()),
            ("up", _) => ConsoleCommand::Up,
            ("down", _) => ConsoleCommand::Down,
            ("mute", _) => ConsoleCommand::Mute,
            ("unmute", _) => ConsoleCommand::Unmute,
            ("authorize", _) => ConsoleCommand::Authorize,
            ("redirect", Some(url)) => ConsoleCommand::Redirect(url.to_string()),
            ("redirect", None) => return Err("redirect needs a URL".into()),
            ("connect", _) => ConsoleCommand::Connect,
            ("disconnect", _) => ConsoleCommand::Disconnect,
            ("vibrate", _) => ConsoleCommand::Vibrate,
            ("torch" | "flashlight", _) => ConsoleCommand::Torch,
            ("status", _) => ConsoleCommand::Status,
            ("help" | "?", _) => ConsoleCommand::Help,
            ("quit" | "exit", _) => ConsoleCommand::Quit,
            (other, _) => return Err(format!("unknown command '{other}'")),
        };
        Ok(Some(command))
    }

    /// Forwards the command to the service. `Status`, `Help` and `Quit` are
    /// handled by the caller.
    pub fn forward(self, handle: &ControlHandle) {
        match self {
            ConsoleCommand::Select(selection) => handle.set_selection(selection),
            ConsoleCommand::Play => handle.toggle_play_pause(),
            ConsoleCommand::Next => handle.skip_to_next(),
            ConsoleCommand::Previous => handle.skip_to_previous(),
            ConsoleCommand::Volume(value) => handle.set_volume(value),
            ConsoleCommand::Up => handle.increase_volume_step(),
            ConsoleCommand::Down => handle.decrease_volume_step(),
            ConsoleCommand::Mute => handle.set_muted(true),
            ConsoleCommand::Unmute => handle.set_muted(false),
            ConsoleCommand::Authorize => handle.authorize(),
            ConsoleCommand::Redirect(url) => handle.set_access_token(url),
            ConsoleCommand::Connect => handle.connect(),
            ConsoleCommand::Disconnect => handle.disconnect(),
            ConsoleCommand::Vibrate => handle.vibrate(),
            ConsoleCommand::Torch => handle.toggle_flashlight(None),
            ConsoleCommand::Status | ConsoleCommand::Help | ConsoleCommand::Quit => {}
        }
    }
}
