//! Tests d'intégration du cycle de vie de la session distante
mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use ckcontrol::{
    ControlError, ControlEventBus, MemoryTokenStore, PlaybackController, RemoteConfig,
    RemoteController, RemoteEvent, RemotePlayerState, SessionState, TokenStore,
};
use common::{FakeRemoteSdk, FlakyTokenStore, REDIRECT_WITH_TOKEN, StateReply};

fn registered_config() -> RemoteConfig {
    RemoteConfig::new("client-42", "controlkit://callback").unwrap()
}

fn remote(sdk: &Arc<FakeRemoteSdk>, store: Option<Arc<dyn TokenStore>>) -> RemoteController {
    RemoteController::new(
        sdk.clone(),
        RemoteConfig::empty(),
        store,
        ControlEventBus::new(),
    )
}

async fn connected(sdk: &Arc<FakeRemoteSdk>) -> RemoteController {
    let mut remote = remote(sdk, None);
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;
    remote.handle_event(RemoteEvent::ConnectionEstablished);
    assert_eq!(remote.session_state(), SessionState::Connected);
    remote
}

#[tokio::test]
async fn test_connect_without_token_does_nothing() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);

    remote.connect().await;

    assert!(sdk.calls().is_empty());
    assert_eq!(remote.session_state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_redirect_then_connect_reaches_connected() {
    let sdk = FakeRemoteSdk::new();
    let bus = ControlEventBus::new();
    let events = bus.subscribe();
    let mut remote = RemoteController::new(sdk.clone(), RemoteConfig::empty(), None, bus);

    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;
    assert_eq!(remote.session_state(), SessionState::Connecting);
    assert_eq!(sdk.calls(), vec!["connect:tok-123"]);

    remote.handle_event(RemoteEvent::ConnectionEstablished);
    assert_eq!(remote.session_state(), SessionState::Connected);

    let states: Vec<_> = events.try_iter().collect();
    assert_eq!(states.len(), 2);
}

#[tokio::test]
async fn test_connect_while_connecting_retries_with_new_token() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;

    // le SDK n'a jamais rappelé
    remote.set_access_token("controlkit://callback#access_token=tok-456");
    remote.connect().await;

    assert_eq!(sdk.calls(), vec!["connect:tok-123", "connect:tok-456"]);
    assert_eq!(remote.session_state(), SessionState::Connecting);

    remote.handle_event(RemoteEvent::ConnectionEstablished);
    assert_eq!(remote.session_state(), SessionState::Connected);
}

#[tokio::test]
async fn test_connect_while_connected_is_ignored() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = connected(&sdk).await;

    remote.connect().await;

    assert_eq!(sdk.calls(), vec!["connect:tok-123"]);
    assert_eq!(remote.session_state(), SessionState::Connected);
}

#[tokio::test]
async fn test_retry_error_while_connecting_returns_to_disconnected() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;

    sdk.fail_connect.store(true, Ordering::SeqCst);
    remote.connect().await;

    assert_eq!(remote.session_state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_connect_error_returns_to_disconnected() {
    let sdk = FakeRemoteSdk::new();
    sdk.fail_connect.store(true, Ordering::SeqCst);
    let mut remote = remote(&sdk, None);
    remote.set_access_token(REDIRECT_WITH_TOKEN);

    remote.connect().await;

    assert_eq!(remote.session_state(), SessionState::Disconnected);
    assert!(remote.has_access_token());
}

#[tokio::test]
async fn test_connection_failure_event_only_resets_state() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;

    remote.handle_event(RemoteEvent::ConnectionFailed {
        error: Some("app not installed".into()),
    });

    assert_eq!(remote.session_state(), SessionState::Disconnected);
    // pas de nouvelle tentative
    assert_eq!(sdk.calls().len(), 1);
    assert!(remote.has_access_token());
}

#[tokio::test]
async fn test_redirect_without_token_keeps_previous_token() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(Some("old-token"));
    let mut remote = remote(&sdk, Some(store.clone()));
    assert!(remote.has_access_token());

    remote.set_access_token("controlkit://callback?error=access_denied");

    assert_eq!(store.stored().as_deref(), Some("old-token"));
    remote.connect().await;
    assert_eq!(sdk.calls(), vec!["connect:old-token"]);
}

#[tokio::test]
async fn test_malformed_redirect_keeps_previous_token() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(Some("old-token"));
    let mut remote = remote(&sdk, Some(store.clone()));

    remote.set_access_token("::nope");
    remote.set_access_token("");

    assert_eq!(store.stored().as_deref(), Some("old-token"));
    remote.connect().await;
    assert_eq!(sdk.calls(), vec!["connect:old-token"]);
}

#[tokio::test]
async fn test_token_is_persisted_on_redirect() {
    let sdk = FakeRemoteSdk::new();
    let store = Arc::new(MemoryTokenStore::new("token"));
    let mut remote = remote(&sdk, Some(store.clone()));

    remote.set_access_token(REDIRECT_WITH_TOKEN);

    assert_eq!(store.get().unwrap(), "tok-123");
}

#[tokio::test]
async fn test_save_failure_still_applies_token() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(None);
    store.fail_save.store(true, Ordering::SeqCst);
    let mut remote = remote(&sdk, Some(store.clone()));

    remote.set_access_token(REDIRECT_WITH_TOKEN);

    assert!(store.stored().is_none());
    assert!(remote.has_access_token());
    remote.connect().await;
    assert_eq!(remote.session_state(), SessionState::Connecting);
}

#[tokio::test]
async fn test_store_read_failure_starts_without_token() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(Some("tok"));
    store.fail_get.store(true, Ordering::SeqCst);

    let remote = remote(&sdk, Some(store));

    assert!(!remote.has_access_token());
}

#[tokio::test]
async fn test_auto_connect_with_seeded_token() {
    let sdk = FakeRemoteSdk::new();
    let store = Arc::new(MemoryTokenStore::with_value("token", "seeded"));
    let mut remote = RemoteController::new(
        sdk.clone(),
        registered_config(),
        Some(store),
        ControlEventBus::new(),
    );

    remote.start(true).await;

    assert_eq!(sdk.calls(), vec!["connect:seeded"]);
    assert_eq!(remote.session_state(), SessionState::Connecting);
}

#[tokio::test]
async fn test_empty_config_never_auto_connects() {
    let sdk = FakeRemoteSdk::new();
    let store = Arc::new(MemoryTokenStore::with_value("token", "seeded"));
    let mut remote = remote(&sdk, Some(store));

    remote.start(true).await;

    assert!(sdk.calls().is_empty());
}

#[tokio::test]
async fn test_disconnect_when_not_connected_is_noop() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(Some("tok"));
    let mut remote = remote(&sdk, Some(store.clone()));

    remote.disconnect().await;

    assert!(sdk.calls().is_empty());
    assert_eq!(store.stored().as_deref(), Some("tok"));
    assert!(remote.has_access_token());
}

#[tokio::test]
async fn test_disconnect_clears_session_and_persisted_token() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(None);
    let mut remote = remote(&sdk, Some(store.clone()));
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;
    remote.handle_event(RemoteEvent::ConnectionEstablished);
    assert_eq!(store.stored().as_deref(), Some("tok-123"));

    remote.disconnect().await;

    assert!(sdk.calls().contains(&"disconnect".to_string()));
    assert!(store.stored().is_none());
    assert!(!remote.has_access_token());
    assert_eq!(remote.session_state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_disconnect_survives_delete_failure() {
    let sdk = FakeRemoteSdk::new();
    let store = FlakyTokenStore::new(None);
    let mut remote = remote(&sdk, Some(store.clone()));
    remote.set_access_token(REDIRECT_WITH_TOKEN);
    remote.connect().await;
    remote.handle_event(RemoteEvent::ConnectionEstablished);
    store.fail_delete.store(true, Ordering::SeqCst);

    remote.disconnect().await;

    assert_eq!(remote.session_state(), SessionState::Disconnected);
    assert!(!remote.has_access_token());
    assert_eq!(store.stored().as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn test_toggle_resumes_when_paused() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = connected(&sdk).await;
    sdk.set_reply(StateReply::Paused);

    tokio_test::assert_ok!(remote.toggle_play_pause().await);

    assert_eq!(sdk.calls().last().map(String::as_str), Some("resume"));
    assert!(remote.is_playing());
}

#[tokio::test]
async fn test_toggle_pauses_when_playing() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = connected(&sdk).await;
    remote.handle_event(RemoteEvent::PlayerStateChanged(RemotePlayerState::playing()));
    sdk.set_reply(StateReply::Playing);

    remote.toggle_play_pause().await.unwrap();

    assert_eq!(sdk.calls().last().map(String::as_str), Some("pause"));
    assert!(!remote.is_playing());
}

#[tokio::test]
async fn test_toggle_issues_no_command_on_query_error() {
    for reply in [StateReply::Error, StateReply::Empty] {
        let sdk = FakeRemoteSdk::new();
        let mut remote = connected(&sdk).await;
        sdk.set_reply(reply);

        assert!(matches!(
            remote.toggle_play_pause().await,
            Err(ControlError::PlayerState(_))
        ));
        let calls = sdk.calls();
        assert!(!calls.contains(&"resume".to_string()));
        assert!(!calls.contains(&"pause".to_string()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_toggle_times_out_without_command() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = connected(&sdk)
        .await
        .with_state_query_timeout(Duration::from_millis(200));
    sdk.set_reply(StateReply::Hang);

    let result = remote.toggle_play_pause().await;

    assert!(matches!(result, Err(ControlError::PlayerStateTimeout(200))));
    assert_eq!(sdk.calls().last().map(String::as_str), Some("player_state"));
}

#[tokio::test]
async fn test_toggle_when_disconnected_is_noop() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);

    tokio_test::assert_ok!(remote.toggle_play_pause().await);
    assert!(sdk.calls().is_empty());
}

#[tokio::test]
async fn test_player_state_event_drives_is_playing() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);

    remote.handle_event(RemoteEvent::PlayerStateChanged(RemotePlayerState::playing()));
    assert!(remote.is_playing());
    remote.handle_event(RemoteEvent::PlayerStateChanged(RemotePlayerState::paused()));
    assert!(!remote.is_playing());
}

#[tokio::test]
async fn test_authorize_resumes_last_item() {
    let sdk = FakeRemoteSdk::new();
    let mut remote = remote(&sdk, None);

    remote.authorize().await;
    remote.authorize_and_play("track:42").await;

    assert_eq!(sdk.calls(), vec!["authorize:", "authorize:track:42"]);
    assert_eq!(remote.session_state(), SessionState::Disconnected);
}
