//! Async shell around the session controller.
//!
//! The runtime owns the token store and the page channel, feeds events into
//! the [`SessionController`] one at a time, and carries out the effects it
//! returns. Timer effects become delayed events on the tokio runtime.

use crate::scripts;
use crate::{
    Effect, HandoffConfig, HandoffError, HandoffResult, PageCommand, PageMessage,
    SessionController, SessionEvent, SessionNotice, SessionPhase, SessionSnapshot,
};
use login_adapters::{AuthError, LoginAdapter};
use parking_lot::Mutex;
use shell_config_and_utils::Config;
use shell_storage::TokenStore;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// The host WebView, as seen by the shell.
///
/// Calls are fire-and-forget. Implementations must not call back into the
/// runtime synchronously.
pub trait PageChannel: Send + Sync + 'static {
    /// Post a string to the page's message inbox.
    fn post_message(&self, message: &str) -> HandoffResult<()>;

    /// Evaluate a script in the page.
    fn inject_script(&self, script: &str) -> HandoffResult<()>;

    /// Reload the page.
    fn reload(&self) -> HandoffResult<()>;

    fn send(&self, command: &PageCommand) -> HandoffResult<()> {
        match command {
            PageCommand::PostMessage(message) => self.post_message(message),
            PageCommand::InjectScript(script) => self.inject_script(script),
            PageCommand::Reload => self.reload(),
        }
    }
}

struct RuntimeInner {
    controller: Mutex<SessionController>,
    handoff: HandoffConfig,
    store: TokenStore,
    page: Arc<dyn PageChannel>,
    notices: broadcast::Sender<SessionNotice>,
    started_at: Instant,
    splash_min_display: Duration,
}

/// Shared shell runtime. Cheap to clone.
#[derive(Clone)]
pub struct ShellRuntime {
    inner: Arc<RuntimeInner>,
}

impl ShellRuntime {
    pub fn new(
        handoff: HandoffConfig,
        splash_min_display: Duration,
        store: TokenStore,
        page: Arc<dyn PageChannel>,
    ) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RuntimeInner {
                controller: Mutex::new(SessionController::new(handoff.clone())),
                handoff,
                store,
                page,
                notices,
                started_at: Instant::now(),
                splash_min_display,
            }),
        }
    }

    pub fn from_config(config: &Config, store: TokenStore, page: Arc<dyn PageChannel>) -> Self {
        Self::new(
            HandoffConfig::from(config),
            config.splash_min_display(),
            store,
            page,
        )
    }

    /// Read the token store and settle the initial session phase.
    pub fn start(&self) -> SessionSnapshot {
        let stored = self.inner.store.load();
        self.dispatch(SessionEvent::Startup { stored });
        self.snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.controller.lock().snapshot()
    }

    /// Subscribe to user-facing notices.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.inner.notices.subscribe()
    }

    /// Whether the splash screen may be hidden: startup is done and the
    /// minimum display time has passed.
    pub fn splash_can_hide(&self) -> bool {
        let started = self.inner.controller.lock().phase() != SessionPhase::Initializing;
        started && self.inner.started_at.elapsed() >= self.inner.splash_min_display
    }

    /// Wait out whatever is left of the minimum splash time.
    pub async fn wait_for_splash(&self) {
        let remaining = self
            .inner
            .splash_min_display
            .saturating_sub(self.inner.started_at.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }

    pub fn page_load_started(&self) {
        self.dispatch(SessionEvent::PageLoadStarted);
    }

    pub fn page_load_finished(&self) {
        self.dispatch(SessionEvent::PageLoadFinished);
    }

    /// Handle a raw message posted by the page.
    pub fn page_message(&self, raw: &str) {
        self.dispatch(SessionEvent::PageMessage(PageMessage::parse(raw)));
    }

    /// Operator-driven re-delivery.
    pub fn request_resend(&self) {
        self.dispatch(SessionEvent::ResendRequested);
    }

    pub fn logout(&self) -> SessionSnapshot {
        self.dispatch(SessionEvent::LogoutRequested);
        self.snapshot()
    }

    /// Run a login adapter and, on success, persist and apply the result.
    ///
    /// Adapter failures leave the session untouched, and so do empty tokens.
    /// The pair is persisted before the session moves to logged in; a failed
    /// save aborts the login and keeps any record already stored.
    pub async fn login<A>(&self, adapter: &A, payload: A::Payload) -> HandoffResult<SessionSnapshot>
    where
        A: LoginAdapter,
    {
        let ticket = self.inner.controller.lock().begin_login();
        let method = adapter.method();

        let tokens = match adapter.login(payload).await {
            Ok(tokens) if tokens.is_valid() => tokens,
            Ok(_) => {
                warn!(method = %method, "Login returned an empty token");
                return Err(AuthError::MalformedResponse(
                    "empty accessToken or refreshToken".to_string(),
                )
                .into());
            }
            Err(e) => {
                warn!(method = %method, error = %e, "Login failed");
                return Err(e.into());
            }
        };

        let mut controller = self.inner.controller.lock();
        if !controller.is_current(ticket) {
            info!(method = %method, "Session changed during login, dropping result");
            return Err(HandoffError::StaleLogin);
        }
        if controller.phase() == SessionPhase::Initializing {
            return Err(HandoffError::Rejected(
                "login before startup finished".to_string(),
            ));
        }
        if !self.inner.store.save(&tokens) {
            warn!(method = %method, "Login succeeded but the session could not be saved");
            return Err(HandoffError::Persistence);
        }

        let effects = controller.handle(SessionEvent::LoginSucceeded { ticket, tokens });
        self.apply_all(effects);
        Ok(controller.snapshot())
    }

    /// Feed one event to the controller and carry out its effects.
    pub fn dispatch(&self, event: SessionEvent) {
        let mut controller = self.inner.controller.lock();
        let effects = controller.handle(event);
        // Applied under the lock so effects of consecutive events never interleave.
        self.apply_all(effects);
        drop(controller);
    }

    fn apply_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&self, effect: Effect) {
        let handoff = &self.inner.handoff;
        match effect {
            Effect::Deliver(tokens) => {
                for command in scripts::delivery_commands(handoff.delivery_mode, &tokens) {
                    self.send_page(&command);
                }
            }
            Effect::InjectReadinessProbe => {
                let script = scripts::readiness_probe_script(
                    handoff.readiness_poll_interval,
                    handoff.readiness_max_attempts,
                );
                self.send_page(&PageCommand::InjectScript(script));
            }
            Effect::ClearPageTokens => {
                self.send_page(&PageCommand::InjectScript(scripts::clear_tokens_script()));
            }
            Effect::ReloadPage => self.send_page(&PageCommand::Reload),
            Effect::ClearStore => self.inner.store.clear(),
            Effect::ScheduleReadinessTimeout { generation, after } => {
                self.schedule(after, SessionEvent::ReadinessTimedOut { generation });
            }
            Effect::ScheduleResend { timer, after } => {
                self.schedule(after, SessionEvent::ResendDue { timer });
            }
            Effect::Notify(notice) => {
                // No subscribers is fine.
                let _ = self.inner.notices.send(notice);
            }
        }
    }

    fn send_page(&self, command: &PageCommand) {
        if let Err(e) = self.inner.page.send(command) {
            warn!(error = %e, "Page channel rejected command");
        }
    }

    fn schedule(&self, after: Duration, event: SessionEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event = ?event, "No async runtime, dropping timer");
            return;
        };

        let inner: Weak<RuntimeInner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(after).await;
            match inner.upgrade() {
                Some(inner) => ShellRuntime { inner }.dispatch(event),
                None => debug!("Runtime gone, timer dropped"),
            }
        });
    }
}
