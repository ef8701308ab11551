//! Async runtime wiring.

use super::harness::{pair, RecordingPage, StubAdapter};
use crate::{
    HandoffConfig, HandoffError, HandoffState, PageChannel, PageCommand, SessionNotice,
    SessionPhase, ShellRuntime,
};
use shell_config_and_utils::DeliveryMode;
use shell_storage::{
    create_file_token_store, create_memory_token_store, KeyValueStore, MemoryStore,
    StorageError, StorageResult, TokenPair, TokenStore,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn runtime_with(store: TokenStore, page: Arc<RecordingPage>) -> ShellRuntime {
    runtime_with_config(HandoffConfig::default(), store, page)
}

fn runtime_with_config(
    config: HandoffConfig,
    store: TokenStore,
    page: Arc<RecordingPage>,
) -> ShellRuntime {
    let channel: Arc<dyn PageChannel> = page;
    ShellRuntime::new(config, Duration::ZERO, store, channel)
}

fn drain(rx: &mut broadcast::Receiver<SessionNotice>) -> Vec<SessionNotice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

fn stored_file(path: &Path) -> Option<TokenPair> {
    create_file_token_store(path).unwrap().load()
}

struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("read-only".into()))
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn delete(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }
}

/// Memory backend whose writes start failing once `failing` is set.
#[derive(Clone, Default)]
struct FailingWrites {
    inner: Arc<MemoryStore>,
    failing: Arc<AtomicBool>,
}

impl KeyValueStore for FailingWrites {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".into()));
        }
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.inner.delete(key)
    }
}

#[tokio::test]
async fn restored_session_reaches_page_after_ready() {
    let store = create_memory_token_store();
    assert!(store.save(&pair(1)));
    let page = RecordingPage::new();
    let runtime = runtime_with(store, page.clone());
    let mut notices = runtime.subscribe();

    let snapshot = runtime.start();
    assert_eq!(snapshot.phase, SessionPhase::LoggedIn);
    assert!(snapshot.pending_tokens);

    runtime.page_load_started();
    runtime.page_load_finished();
    assert_eq!(page.scripts_containing("WEBVIEW_READY"), 1);
    assert_eq!(page.token_messages(), 0);

    runtime.page_message("WEBVIEW_READY");
    assert_eq!(page.token_messages(), 1);
    assert_eq!(page.scripts_containing("localStorage.setItem"), 1);

    runtime.page_message("TOKEN_SAVED_SUCCESS");
    assert!(runtime.snapshot().delivered);
    assert_eq!(
        drain(&mut notices),
        vec![
            SessionNotice::LoggedIn { restored: true },
            SessionNotice::DeliveryConfirmed,
        ]
    );
}

#[tokio::test]
async fn message_only_mode_skips_script_channel() {
    let store = create_memory_token_store();
    assert!(store.save(&pair(1)));
    let page = RecordingPage::new();
    let config = HandoffConfig {
        delivery_mode: DeliveryMode::Message,
        ..HandoffConfig::default()
    };
    let runtime = runtime_with_config(config, store, page.clone());

    runtime.start();
    runtime.page_load_started();
    runtime.page_message("WEBVIEW_READY");

    assert_eq!(page.token_messages(), 1);
    assert_eq!(page.scripts_containing("localStorage.setItem"), 0);
}

#[tokio::test]
async fn login_persists_then_delivers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let page = RecordingPage::new();
    let runtime = runtime_with(create_file_token_store(&path).unwrap(), page.clone());
    runtime.start();
    runtime.page_load_started();
    runtime.page_message("WEBVIEW_READY");

    let adapter = StubAdapter::ok(pair(7));
    let snapshot = runtime.login(&adapter, ()).await.unwrap();

    assert_eq!(snapshot.phase, SessionPhase::LoggedIn);
    assert_eq!(stored_file(&path), Some(pair(7)));
    assert_eq!(page.token_messages(), 1);
}

#[tokio::test]
async fn failed_login_changes_nothing() {
    let page = RecordingPage::new();
    let runtime = runtime_with(create_memory_token_store(), page.clone());
    runtime.start();
    let before = runtime.snapshot();

    let adapter = StubAdapter::rejected(503);
    let err = runtime.login(&adapter, ()).await.unwrap_err();

    assert!(matches!(err, HandoffError::Login(_)));
    assert_eq!(err.user_message(), login_adapters::GENERIC_LOGIN_FAILURE);
    assert_eq!(runtime.snapshot(), before);
    assert!(page.commands().is_empty());
}

#[tokio::test]
async fn unsaved_login_is_not_applied() {
    let page = RecordingPage::new();
    let runtime = runtime_with(TokenStore::new(Box::new(ReadOnlyStore)), page.clone());
    runtime.start();
    runtime.page_load_started();
    runtime.page_message("WEBVIEW_READY");

    let adapter = StubAdapter::ok(pair(1));
    let err = runtime.login(&adapter, ()).await.unwrap_err();

    assert!(matches!(err, HandoffError::Persistence));
    assert_eq!(runtime.snapshot().phase, SessionPhase::LoggedOut);
    assert_eq!(page.token_messages(), 0);
}

#[tokio::test]
async fn failed_relogin_keeps_stored_session() {
    let backend = FailingWrites::default();
    let store = TokenStore::new(Box::new(backend.clone()));
    assert!(store.save(&pair(1)));
    let page = RecordingPage::new();
    let runtime = runtime_with(store, page.clone());
    assert_eq!(runtime.start().phase, SessionPhase::LoggedIn);

    backend.failing.store(true, Ordering::SeqCst);
    let err = runtime
        .login(&StubAdapter::ok(pair(2)), ())
        .await
        .unwrap_err();

    assert!(matches!(err, HandoffError::Persistence));
    assert_eq!(runtime.snapshot().phase, SessionPhase::LoggedIn);

    // Next launch still finds the session the page was given.
    backend.failing.store(false, Ordering::SeqCst);
    let relaunched = TokenStore::new(Box::new(backend));
    assert_eq!(relaunched.load(), Some(pair(1)));
}

#[tokio::test]
async fn empty_tokens_from_relogin_keep_stored_session() {
    let backend = FailingWrites::default();
    let store = TokenStore::new(Box::new(backend.clone()));
    assert!(store.save(&pair(1)));
    let runtime = runtime_with(store, RecordingPage::new());
    runtime.start();

    let adapter = StubAdapter::ok(TokenPair::new("", "refresh"));
    let err = runtime.login(&adapter, ()).await.unwrap_err();

    assert!(matches!(err, HandoffError::Login(_)));
    assert_eq!(runtime.snapshot().phase, SessionPhase::LoggedIn);
    assert_eq!(TokenStore::new(Box::new(backend)).load(), Some(pair(1)));
}

#[tokio::test]
async fn login_before_startup_is_rejected() {
    let runtime = runtime_with(create_memory_token_store(), RecordingPage::new());
    let adapter = StubAdapter::ok(pair(1));

    let err = runtime.login(&adapter, ()).await.unwrap_err();
    assert!(matches!(err, HandoffError::Rejected(_)));
}

#[tokio::test]
async fn logout_during_login_discards_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let runtime = runtime_with(create_file_token_store(&path).unwrap(), RecordingPage::new());
    runtime.start();

    let (adapter, gate) = StubAdapter::gated(pair(3));
    let adapter = Arc::new(adapter);
    let task = {
        let runtime = runtime.clone();
        let adapter = adapter.clone();
        tokio::spawn(async move { runtime.login(&*adapter, ()).await })
    };

    while adapter.calls() == 0 {
        tokio::task::yield_now().await;
    }
    runtime.logout();
    gate.notify_one();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(HandoffError::StaleLogin)));
    assert_eq!(runtime.snapshot().phase, SessionPhase::LoggedOut);
    assert_eq!(stored_file(&path), None);
}

#[tokio::test]
async fn logout_clears_store_and_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = create_file_token_store(&path).unwrap();
    assert!(store.save(&pair(1)));
    let page = RecordingPage::new();
    let runtime = runtime_with(store, page.clone());
    runtime.start();

    let snapshot = runtime.logout();

    assert_eq!(snapshot.phase, SessionPhase::LoggedOut);
    assert_eq!(stored_file(&path), None);
    assert_eq!(page.scripts_containing("removeItem"), 1);
    assert_eq!(page.reloads(), 1);
    assert_eq!(page.commands().last(), Some(&PageCommand::Reload));
}

#[tokio::test(start_paused = true)]
async fn router_error_resend_fires_after_delay() {
    let store = create_memory_token_store();
    assert!(store.save(&pair(1)));
    let page = RecordingPage::new();
    let runtime = runtime_with(store, page.clone());
    runtime.start();
    runtime.page_load_started();
    runtime.page_message("WEBVIEW_READY");
    assert_eq!(page.token_messages(), 1);

    runtime.page_message(r#"{"type":"ROUTER_ERROR","error":"x","path":"/"}"#);
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(page.token_messages(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;
    assert_eq!(page.token_messages(), 2);

    // Nothing else is queued
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(page.token_messages(), 2);
}

#[tokio::test(start_paused = true)]
async fn readiness_timeout_surfaces_notice() {
    let store = create_memory_token_store();
    assert!(store.save(&pair(1)));
    let runtime = runtime_with(store, RecordingPage::new());
    let mut notices = runtime.subscribe();
    runtime.start();
    runtime.page_load_started();
    runtime.page_load_finished();

    tokio::time::sleep(Duration::from_millis(5_100)).await;
    tokio::task::yield_now().await;

    assert_eq!(runtime.snapshot().handoff, HandoffState::Stalled);
    assert!(drain(&mut notices).contains(&SessionNotice::ReadinessTimedOut {
        tokens_pending: true,
    }));
}

#[tokio::test(start_paused = true)]
async fn reload_defuses_readiness_timeout() {
    let runtime = runtime_with(create_memory_token_store(), RecordingPage::new());
    runtime.start();
    runtime.page_load_started();
    runtime.page_load_finished();

    tokio::time::sleep(Duration::from_secs(3)).await;
    runtime.page_load_started();
    runtime.page_load_finished();

    // First timer fires at 5s and is stale; the second is due at 8s
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    tokio::task::yield_now().await;
    assert_eq!(runtime.snapshot().handoff, HandoffState::Probing);
}

#[test]
fn timers_without_async_runtime_are_dropped() {
    let runtime = runtime_with(create_memory_token_store(), RecordingPage::new());
    runtime.start();
    runtime.page_load_started();
    runtime.page_load_finished();
    assert_eq!(runtime.snapshot().handoff, HandoffState::Probing);
}

#[test]
fn splash_waits_for_startup() {
    let runtime = runtime_with(create_memory_token_store(), RecordingPage::new());
    assert!(!runtime.splash_can_hide());
    runtime.start();
    assert!(runtime.splash_can_hide());

    let slow = ShellRuntime::new(
        HandoffConfig::default(),
        Duration::from_secs(3600),
        create_memory_token_store(),
        RecordingPage::new(),
    );
    slow.start();
    assert!(!slow.splash_can_hide());
}
