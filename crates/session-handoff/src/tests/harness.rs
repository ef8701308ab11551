//! Test harness for the handoff controller.

use crate::{
    Effect, HandoffConfig, HandoffResult, PageChannel, PageCommand, PageMessage,
    SessionController, SessionEvent,
};
use async_trait::async_trait;
use login_adapters::{AuthError, AuthResult, LoginAdapter, LoginMethod, TokenPair};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn pair(n: u32) -> TokenPair {
    TokenPair::new(format!("access-{n}"), format!("refresh-{n}"))
}

/// Drives a [`SessionController`] and keeps every effect it produced.
pub struct TestHarness {
    pub controller: SessionController,
    pub log: Vec<Effect>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            controller: SessionController::new(HandoffConfig::default()),
            log: Vec::new(),
        }
    }

    /// A controller that already ran startup.
    pub fn started(stored: Option<TokenPair>) -> Self {
        let mut harness = Self::new();
        harness.send(SessionEvent::Startup { stored });
        harness
    }

    pub fn send(&mut self, event: SessionEvent) -> Vec<Effect> {
        let effects = self.controller.handle(event);
        self.log.extend(effects.iter().cloned());
        effects
    }

    pub fn page(&mut self, raw: &str) -> Vec<Effect> {
        self.send(SessionEvent::PageMessage(PageMessage::parse(raw)))
    }

    pub fn login(&mut self, tokens: TokenPair) -> Vec<Effect> {
        let ticket = self.controller.begin_login();
        self.send(SessionEvent::LoginSucceeded { ticket, tokens })
    }

    /// Load start + load end; returns the load-end effects.
    pub fn load_page(&mut self) -> Vec<Effect> {
        self.send(SessionEvent::PageLoadStarted);
        self.send(SessionEvent::PageLoadFinished)
    }

    /// Load the page and let it report ready.
    pub fn ready_page(&mut self) -> Vec<Effect> {
        self.load_page();
        self.page("WEBVIEW_READY")
    }

    pub fn deliveries(&self) -> Vec<&TokenPair> {
        deliveries(&self.log)
    }
}

pub fn deliveries(effects: &[Effect]) -> Vec<&TokenPair> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Deliver(tokens) => Some(tokens),
            _ => None,
        })
        .collect()
}

pub fn scheduled_resend(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|effect| match effect {
        Effect::ScheduleResend { timer, .. } => Some(*timer),
        _ => None,
    })
}

/// Page channel that records every command.
#[derive(Default)]
pub struct RecordingPage {
    commands: Mutex<Vec<PageCommand>>,
}

impl RecordingPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<PageCommand> {
        self.commands.lock().clone()
    }

    pub fn token_messages(&self) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, PageCommand::PostMessage(m) if m.contains("accessToken")))
            .count()
    }

    pub fn reloads(&self) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, PageCommand::Reload))
            .count()
    }

    pub fn scripts_containing(&self, needle: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, PageCommand::InjectScript(s) if s.contains(needle)))
            .count()
    }
}

impl PageChannel for RecordingPage {
    fn post_message(&self, message: &str) -> HandoffResult<()> {
        self.commands
            .lock()
            .push(PageCommand::PostMessage(message.to_string()));
        Ok(())
    }

    fn inject_script(&self, script: &str) -> HandoffResult<()> {
        self.commands
            .lock()
            .push(PageCommand::InjectScript(script.to_string()));
        Ok(())
    }

    fn reload(&self) -> HandoffResult<()> {
        self.commands.lock().push(PageCommand::Reload);
        Ok(())
    }
}

/// Adapter returning a canned result and counting calls.
pub struct StubAdapter {
    result: Mutex<Option<AuthResult<TokenPair>>>,
    calls: AtomicUsize,
    gate: Option<Arc<tokio::sync::Notify>>,
}

impl StubAdapter {
    pub fn ok(tokens: TokenPair) -> Self {
        Self {
            result: Mutex::new(Some(Ok(tokens))),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn rejected(status: u16) -> Self {
        Self {
            result: Mutex::new(Some(Err(AuthError::Rejected {
                operation: "stub login",
                status,
                body_summary: String::new(),
            }))),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Block inside `login` until the returned notify fires.
    pub fn gated(tokens: TokenPair) -> (Self, Arc<tokio::sync::Notify>) {
        let gate = Arc::new(tokio::sync::Notify::new());
        let adapter = Self {
            result: Mutex::new(Some(Ok(tokens))),
            calls: AtomicUsize::new(0),
            gate: Some(gate.clone()),
        };
        (adapter, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginAdapter for StubAdapter {
    type Payload = ();

    fn method(&self) -> LoginMethod {
        LoginMethod::Temporary
    }

    async fn login(&self, _payload: ()) -> AuthResult<TokenPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result
            .lock()
            .take()
            .unwrap_or_else(|| Err(AuthError::MalformedResponse("stub exhausted".into())))
    }
}
