//! Remote streaming backend.
//!
//! A third-party streaming app is driven through its out-of-process SDK
//! ([`RemoteSdk`]). The adapter owns the [`RemoteSession`] (connection state
//! plus access token), the authorization hand-off through a redirect URL and
//! the handling of the SDK delegate callbacks ([`RemoteEvent`]).

mod config;
mod controller;
mod redirect;
mod sdk;
mod session;

pub use config::{RemoteConfig, RemoteLogLevel};
pub use controller::{DEFAULT_STATE_QUERY_TIMEOUT, RemoteController};
pub use redirect::{ACCESS_TOKEN_KEY, ERROR_DESCRIPTION_KEY, parse_access_token};
pub use sdk::{RemoteEvent, RemoteEventReceiver, RemoteEventSender, RemoteSdk, remote_event_channel};
pub use session::{AccessToken, RemoteSession};
