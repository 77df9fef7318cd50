//! Fakes des services de l'appareil partagés par les tests d'intégration
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ckcontrol::{
    AccessToken, AudioSession, ControlError, DeviceServices, Flashlight, Haptics, MusicPlayer,
    MusicPlaybackState, RemoteEvent, RemoteEventSender, RemotePlayerState, RemoteSdk,
    StoreError, SystemVolume, TokenStore,
};

pub struct FakeAudioSession {
    pub other_playing: Mutex<bool>,
    pub available: AtomicBool,
    pub activations: Mutex<Vec<bool>>,
}

impl FakeAudioSession {
    pub fn new(other_playing: bool) -> Arc<Self> {
        Arc::new(Self {
            other_playing: Mutex::new(other_playing),
            available: AtomicBool::new(true),
            activations: Mutex::new(Vec::new()),
        })
    }

    pub fn activations(&self) -> Vec<bool> {
        self.activations.lock().unwrap().clone()
    }
}

impl AudioSession for FakeAudioSession {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn is_other_audio_playing(&self) -> bool {
        *self.other_playing.lock().unwrap()
    }

    fn set_active(&self, active: bool) -> Result<(), ControlError> {
        self.activations.lock().unwrap().push(active);
        *self.other_playing.lock().unwrap() = !active;
        Ok(())
    }
}

pub struct FakeMusicPlayer {
    pub state: Mutex<MusicPlaybackState>,
    pub calls: Mutex<Vec<&'static str>>,
    pub fail_skips: AtomicBool,
}

impl FakeMusicPlayer {
    pub fn new(state: MusicPlaybackState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            calls: Mutex::new(Vec::new()),
            fail_skips: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn skip_result(&self) -> Result<(), ControlError> {
        if self.fail_skips.load(Ordering::SeqCst) {
            Err(ControlError::MediaPlayer("no queue".into()))
        } else {
            Ok(())
        }
    }
}

impl MusicPlayer for FakeMusicPlayer {
    fn playback_state(&self) -> MusicPlaybackState {
        *self.state.lock().unwrap()
    }

    fn play(&self) -> Result<(), ControlError> {
        self.record("play");
        *self.state.lock().unwrap() = MusicPlaybackState::Playing;
        Ok(())
    }

    fn pause(&self) -> Result<(), ControlError> {
        self.record("pause");
        *self.state.lock().unwrap() = MusicPlaybackState::Paused;
        Ok(())
    }

    fn skip_to_next_item(&self) -> Result<(), ControlError> {
        self.record("next");
        self.skip_result()
    }

    fn skip_to_previous_item(&self) -> Result<(), ControlError> {
        self.record("previous");
        self.skip_result()
    }
}

pub struct FakeVolume {
    pub level: Mutex<Option<f32>>,
}

impl FakeVolume {
    pub fn new(level: f32) -> Arc<Self> {
        Arc::new(Self {
            level: Mutex::new(Some(level)),
        })
    }

    pub fn level(&self) -> Option<f32> {
        *self.level.lock().unwrap()
    }

    pub fn set_externally(&self, level: f32) {
        *self.level.lock().unwrap() = Some(level);
    }
}

impl SystemVolume for FakeVolume {
    fn output_level(&self) -> Option<f32> {
        self.level()
    }

    fn set_output_level(&self, level: f32) -> Result<(), ControlError> {
        *self.level.lock().unwrap() = Some(level);
        Ok(())
    }
}

/// What the fake SDK answers to a player-state query.
#[derive(Clone, Debug)]
pub enum StateReply {
    Paused,
    Playing,
    Empty,
    Error,
    /// Never answers.
    Hang,
}

pub struct FakeRemoteSdk {
    pub calls: Mutex<Vec<String>>,
    pub reply: Mutex<StateReply>,
    pub fail_connect: AtomicBool,
    pub fail_skips: AtomicBool,
    pub fail_disconnect: AtomicBool,
    /// When set, `connect` / `disconnect` report completion through the
    /// delegate channel, like the real SDK.
    pub delegate: Mutex<Option<RemoteEventSender>>,
}

impl FakeRemoteSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Mutex::new(StateReply::Paused),
            fail_connect: AtomicBool::new(false),
            fail_skips: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            delegate: Mutex::new(None),
        })
    }

    pub fn with_delegate(delegate: RemoteEventSender) -> Arc<Self> {
        let sdk = Self::new();
        *sdk.delegate.lock().unwrap() = Some(delegate);
        sdk
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_reply(&self, reply: StateReply) {
        *self.reply.lock().unwrap() = reply;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn notify(&self, event: RemoteEvent) {
        if let Some(delegate) = self.delegate.lock().unwrap().as_ref() {
            let _ = delegate.send(event);
        }
    }

    fn fail_if(flag: &AtomicBool, what: &str) -> Result<(), ControlError> {
        if flag.load(Ordering::SeqCst) {
            Err(ControlError::remote_sdk(format!("{what} failed")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteSdk for FakeRemoteSdk {
    async fn connect(&self, token: &AccessToken) -> Result<(), ControlError> {
        self.record(format!("connect:{}", token.expose()));
        Self::fail_if(&self.fail_connect, "connect")?;
        self.notify(RemoteEvent::ConnectionEstablished);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ControlError> {
        self.record("disconnect");
        Self::fail_if(&self.fail_disconnect, "disconnect")?;
        self.notify(RemoteEvent::Disconnected { error: None });
        Ok(())
    }

    async fn authorize_and_play(&self, uri: &str) -> Result<(), ControlError> {
        self.record(format!("authorize:{uri}"));
        Ok(())
    }

    async fn player_state(&self) -> Result<Option<RemotePlayerState>, ControlError> {
        self.record("player_state");
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            StateReply::Paused => Ok(Some(RemotePlayerState::paused())),
            StateReply::Playing => Ok(Some(RemotePlayerState::playing())),
            StateReply::Empty => Ok(None),
            StateReply::Error => Err(ControlError::remote_sdk("player API unavailable")),
            StateReply::Hang => std::future::pending().await,
        }
    }

    async fn resume(&self) -> Result<(), ControlError> {
        self.record("resume");
        Ok(())
    }

    async fn pause(&self) -> Result<(), ControlError> {
        self.record("pause");
        Ok(())
    }

    async fn skip_to_next(&self) -> Result<(), ControlError> {
        self.record("next");
        Self::fail_if(&self.fail_skips, "skip")
    }

    async fn skip_to_previous(&self) -> Result<(), ControlError> {
        self.record("previous");
        Self::fail_if(&self.fail_skips, "skip")
    }
}

#[derive(Default)]
pub struct FakeHaptics {
    pub impacts: AtomicUsize,
}

impl Haptics for FakeHaptics {
    fn impact(&self) {
        self.impacts.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeFlashlight {
    pub on: AtomicBool,
}

impl Flashlight for FakeFlashlight {
    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn set_on(&self, on: bool) -> Result<(), ControlError> {
        self.on.store(on, Ordering::SeqCst);
        Ok(())
    }
}

/// Token store whose operations can be made to fail one by one.
pub struct FlakyTokenStore {
    pub value: Mutex<Option<String>>,
    pub fail_get: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FlakyTokenStore {
    pub fn new(value: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(value.map(str::to_string)),
            fail_get: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        })
    }

    pub fn stored(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }
}

impl TokenStore for FlakyTokenStore {
    fn coding_key(&self) -> &str {
        "test_token"
    }

    fn get(&self) -> Result<String, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("keychain locked".into()));
        }
        self.stored()
            .ok_or_else(|| StoreError::NotFound(self.coding_key().to_string()))
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".into()));
        }
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("read-only".into()));
        }
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}

/// Every fake, plus the [`DeviceServices`] wired over them.
pub struct Rig {
    pub audio: Arc<FakeAudioSession>,
    pub music: Arc<FakeMusicPlayer>,
    pub volume: Arc<FakeVolume>,
    pub remote: Arc<FakeRemoteSdk>,
    pub haptics: Arc<FakeHaptics>,
    pub flashlight: Arc<FakeFlashlight>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_remote(FakeRemoteSdk::new())
    }

    pub fn with_remote(remote: Arc<FakeRemoteSdk>) -> Self {
        Self {
            audio: FakeAudioSession::new(false),
            music: FakeMusicPlayer::new(MusicPlaybackState::Paused),
            volume: FakeVolume::new(0.5),
            remote,
            haptics: Arc::new(FakeHaptics::default()),
            flashlight: Arc::new(FakeFlashlight::default()),
        }
    }

    pub fn services(&self) -> DeviceServices {
        DeviceServices::new(
            self.audio.clone(),
            self.music.clone(),
            self.volume.clone(),
            self.remote.clone(),
        )
        .with_haptics(self.haptics.clone())
        .with_flashlight(self.flashlight.clone())
    }

    /// Services without haptics nor torch.
    pub fn bare_services(&self) -> DeviceServices {
        DeviceServices::new(
            self.audio.clone(),
            self.music.clone(),
            self.volume.clone(),
            self.remote.clone(),
        )
    }
}

pub const REDIRECT_WITH_TOKEN: &str = "controlkit://callback#access_token=tok-123&token_type=Bearer";
