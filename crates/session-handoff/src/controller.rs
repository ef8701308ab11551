//! The session controller.
//!
//! Holds the one mutable session state of the shell. Every transition is a
//! call to [`SessionController::handle`], which updates the state and returns
//! the effects the host has to perform, in order. Nothing here does I/O or
//! reads the clock, so whole event sequences can be replayed in tests.

use crate::fsm::{
    HandoffState, PageMachine, PageMachineInput, SessionMachine, SessionMachineInput,
    SessionPhase,
};
use crate::PageMessage;
use serde::{Deserialize, Serialize};
use shell_config_and_utils::{Config, DeliveryMode};
use shell_storage::TokenPair;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Timing and channel settings for the handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    pub delivery_mode: DeliveryMode,
    pub readiness_poll_interval: Duration,
    pub readiness_max_attempts: u32,
    pub resend_delay: Duration,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::Dual,
            readiness_poll_interval: Duration::from_millis(500),
            readiness_max_attempts: 10,
            resend_delay: Duration::from_secs(1),
        }
    }
}

impl HandoffConfig {
    /// How long the probe polls before the page counts as stalled.
    pub fn readiness_ceiling(&self) -> Duration {
        self.readiness_poll_interval
            .checked_mul(self.readiness_max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

impl From<&Config> for HandoffConfig {
    fn from(config: &Config) -> Self {
        Self {
            delivery_mode: config.delivery_mode,
            readiness_poll_interval: config.readiness_poll_interval(),
            readiness_max_attempts: config.readiness_max_attempts,
            resend_delay: config.resend_delay(),
        }
    }
}

/// Proof that a login was started under the current session.
///
/// A logout in the meantime invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTicket {
    epoch: u64,
}

/// Everything that can happen to the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Result of reading the token store at process start.
    Startup { stored: Option<TokenPair> },
    /// A login adapter succeeded and the pair is already persisted.
    LoginSucceeded {
        ticket: LoginTicket,
        tokens: TokenPair,
    },
    LogoutRequested,
    PageLoadStarted,
    PageLoadFinished,
    PageMessage(PageMessage),
    /// The readiness ceiling for page load `generation` elapsed.
    ReadinessTimedOut { generation: u64 },
    /// A scheduled re-send is due.
    ResendDue { timer: u64 },
    /// Operator asked to push the tokens again.
    ResendRequested,
}

/// User-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum SessionNotice {
    LoggedIn { restored: bool },
    LoggedOut,
    DeliveryConfirmed,
    DeliveryFailed { critical: bool },
    /// The page never signalled readiness.
    ReadinessTimedOut { tokens_pending: bool },
}

/// Work the host performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the pair to the page through the configured channels.
    Deliver(TokenPair),
    InjectReadinessProbe,
    ClearPageTokens,
    ReloadPage,
    ClearStore,
    /// Feed [`SessionEvent::ReadinessTimedOut`] back after `after`.
    ScheduleReadinessTimeout { generation: u64, after: Duration },
    /// Feed [`SessionEvent::ResendDue`] back after `after`.
    ScheduleResend { timer: u64, after: Duration },
    Notify(SessionNotice),
}

/// Serializable view of the session for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub handoff: HandoffState,
    pub logged_in: bool,
    pub has_tokens: bool,
    pub page_ready: bool,
    pub pending_tokens: bool,
    pub delivered: bool,
    pub resend_scheduled: bool,
    pub page_generation: u64,
}

/// Single owner of the session state.
pub struct SessionController {
    config: HandoffConfig,
    session: SessionMachine,
    page: PageMachine,
    tokens: Option<TokenPair>,
    pending: Option<TokenPair>,
    /// Timer id of the one outstanding re-send, if any.
    scheduled_resend: Option<u64>,
    next_timer: u64,
    /// Bumped on every page load start and teardown.
    generation: u64,
    /// Bumped on logout.
    epoch: u64,
}

impl SessionController {
    pub fn new(config: HandoffConfig) -> Self {
        Self {
            config,
            session: SessionMachine::new(),
            page: PageMachine::new(),
            tokens: None,
            pending: None,
            scheduled_resend: None,
            next_timer: 0,
            generation: 0,
            epoch: 0,
        }
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from(self.session.state())
    }

    pub fn handoff_state(&self) -> HandoffState {
        HandoffState::from(self.page.state())
    }

    pub fn is_logged_in(&self) -> bool {
        self.phase().is_logged_in()
    }

    pub fn is_page_ready(&self) -> bool {
        self.handoff_state().is_page_ready()
    }

    pub fn is_delivered(&self) -> bool {
        self.handoff_state().is_delivered()
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn pending_tokens(&self) -> Option<&TokenPair> {
        self.pending.as_ref()
    }

    pub fn page_generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let handoff = self.handoff_state();
        SessionSnapshot {
            phase: self.phase(),
            handoff,
            logged_in: self.is_logged_in(),
            has_tokens: self.tokens.is_some(),
            page_ready: handoff.is_page_ready(),
            pending_tokens: self.pending.is_some(),
            delivered: handoff.is_delivered(),
            resend_scheduled: self.scheduled_resend.is_some(),
            page_generation: self.generation,
        }
    }

    /// Start a login under the current session.
    pub fn begin_login(&self) -> LoginTicket {
        LoginTicket { epoch: self.epoch }
    }

    /// Whether a login started with `ticket` may still be applied.
    pub fn is_current(&self, ticket: LoginTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Apply one event and return the resulting effects.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            SessionEvent::Startup { stored } => self.on_startup(stored, &mut effects),
            SessionEvent::LoginSucceeded { ticket, tokens } => {
                self.on_login(ticket, tokens, &mut effects)
            }
            SessionEvent::LogoutRequested => self.on_logout(&mut effects),
            SessionEvent::PageLoadStarted => self.on_load_started(),
            SessionEvent::PageLoadFinished => self.on_load_finished(&mut effects),
            SessionEvent::PageMessage(message) => self.on_page_message(message, &mut effects),
            SessionEvent::ReadinessTimedOut { generation } => {
                self.on_readiness_timeout(generation, &mut effects)
            }
            SessionEvent::ResendDue { timer } => self.on_resend_due(timer, &mut effects),
            SessionEvent::ResendRequested => self.on_resend_requested(&mut effects),
        }
        effects
    }

    fn session_transition(&mut self, input: SessionMachineInput) -> bool {
        let old = self.phase();
        if self.session.consume(&input).is_err() {
            warn!(input = ?input, phase = ?old, "Ignoring session input in current phase");
            return false;
        }
        let new = self.phase();
        if old != new {
            debug!(old_phase = ?old, new_phase = ?new, "Session transition");
        }
        true
    }

    fn page_transition(&mut self, input: PageMachineInput) -> bool {
        let old = self.handoff_state();
        if self.page.consume(&input).is_err() {
            debug!(input = ?input, state = ?old, "Page input not applicable");
            return false;
        }
        let new = self.handoff_state();
        if old != new {
            debug!(
                old_state = ?old,
                new_state = ?new,
                generation = self.generation,
                "Handoff transition"
            );
        }
        true
    }

    /// Hand the current pair to the page, or hold it until the page is ready.
    fn deliver_or_buffer(&mut self, effects: &mut Vec<Effect>) {
        let Some(tokens) = self.tokens.clone() else {
            return;
        };
        if self.is_page_ready() {
            self.pending = None;
            debug!(generation = self.generation, "Delivering tokens to page");
            effects.push(Effect::Deliver(tokens));
        } else {
            if self.pending.is_some() {
                debug!("Replacing buffered tokens");
            }
            self.pending = Some(tokens);
        }
    }

    fn on_startup(&mut self, stored: Option<TokenPair>, effects: &mut Vec<Effect>) {
        let stored = stored.filter(TokenPair::is_valid);
        let input = if stored.is_some() {
            SessionMachineInput::StoredSessionFound
        } else {
            SessionMachineInput::NoStoredSession
        };
        if !self.session_transition(input) {
            return;
        }

        match stored {
            Some(tokens) => {
                info!("Restored stored session");
                self.tokens = Some(tokens);
                self.deliver_or_buffer(effects);
                effects.push(Effect::Notify(SessionNotice::LoggedIn { restored: true }));
            }
            None => {
                info!("No stored session");
                effects.push(Effect::Notify(SessionNotice::LoggedOut));
            }
        }
    }

    fn on_login(&mut self, ticket: LoginTicket, tokens: TokenPair, effects: &mut Vec<Effect>) {
        if !self.is_current(ticket) {
            info!("Discarding login result from a previous session");
            return;
        }
        if !tokens.is_valid() {
            warn!("Discarding login result with an empty token");
            return;
        }
        if !self.session_transition(SessionMachineInput::LoginSucceeded) {
            return;
        }

        if self.is_delivered() {
            self.page_transition(PageMachineInput::TokensSuperseded);
        }
        self.scheduled_resend = None;
        self.tokens = Some(tokens);
        self.deliver_or_buffer(effects);

        info!(page_ready = self.is_page_ready(), "Logged in");
        effects.push(Effect::Notify(SessionNotice::LoggedIn { restored: false }));
    }

    fn on_logout(&mut self, effects: &mut Vec<Effect>) {
        if !self.session_transition(SessionMachineInput::LogoutRequested) {
            return;
        }

        self.epoch += 1;
        self.generation += 1;
        self.tokens = None;
        self.pending = None;
        self.scheduled_resend = None;
        self.page_transition(PageMachineInput::Teardown);

        info!("Logged out");
        effects.extend([
            Effect::ClearStore,
            Effect::ClearPageTokens,
            Effect::ReloadPage,
            Effect::Notify(SessionNotice::LoggedOut),
        ]);
    }

    fn on_load_started(&mut self) {
        self.generation += 1;
        self.scheduled_resend = None;
        self.page_transition(PageMachineInput::LoadStarted);

        // The new page instance needs the tokens again.
        if self.pending.is_none() {
            self.pending = self.tokens.clone();
        }
        debug!(
            generation = self.generation,
            tokens_pending = self.pending.is_some(),
            "Page load started"
        );
    }

    fn on_load_finished(&mut self, effects: &mut Vec<Effect>) {
        let was_ready = self.is_page_ready();
        if !self.page_transition(PageMachineInput::LoadFinished) || was_ready {
            return;
        }

        debug!(generation = self.generation, "Page load finished, probing readiness");
        effects.push(Effect::InjectReadinessProbe);
        effects.push(Effect::ScheduleReadinessTimeout {
            generation: self.generation,
            after: self.config.readiness_ceiling(),
        });
    }

    fn on_page_message(&mut self, message: PageMessage, effects: &mut Vec<Effect>) {
        match message {
            PageMessage::WebviewReady => {
                let was_ready = self.is_page_ready();
                if !self.page_transition(PageMachineInput::ReadySignal) {
                    debug!("Readiness signal from a page that is not loaded");
                    return;
                }
                if was_ready {
                    debug!("Duplicate readiness signal");
                    return;
                }
                info!(generation = self.generation, "Page ready");
                if self.pending.is_some() {
                    self.deliver_or_buffer(effects);
                }
            }
            PageMessage::TokenSavedSuccess | PageMessage::TokenAlreadyExists => {
                if self.tokens.is_none() {
                    debug!("Ignoring save acknowledgement without a session");
                    return;
                }
                let was_delivered = self.is_delivered();
                if !self.page_transition(PageMachineInput::DeliveryAcknowledged) {
                    return;
                }
                self.scheduled_resend = None;
                if !was_delivered {
                    info!(generation = self.generation, "Page confirmed tokens");
                    effects.push(Effect::Notify(SessionNotice::DeliveryConfirmed));
                }
            }
            PageMessage::TokenSavedError => {
                warn!(generation = self.generation, "Page failed to save tokens");
                effects.push(Effect::Notify(SessionNotice::DeliveryFailed { critical: false }));
            }
            PageMessage::TokenSavedCriticalError => {
                error!(generation = self.generation, "Page hit a critical error saving tokens");
                effects.push(Effect::Notify(SessionNotice::DeliveryFailed { critical: true }));
            }
            PageMessage::TokensCleared => {
                info!("Page cleared its tokens");
            }
            PageMessage::RouterError { error, path } => {
                warn!(
                    error = error.as_deref().unwrap_or(""),
                    path = path.as_deref().unwrap_or(""),
                    "Page router error"
                );
                self.schedule_resend(effects);
            }
            PageMessage::Unknown(raw) => {
                let preview: String = raw.chars().take(64).collect();
                debug!(message = %preview, "Ignoring unrecognized page message");
            }
        }
    }

    fn schedule_resend(&mut self, effects: &mut Vec<Effect>) {
        if self.is_delivered() || self.tokens.is_none() {
            return;
        }
        if self.scheduled_resend.is_some() {
            debug!("Re-send already scheduled");
            return;
        }

        let timer = self.next_timer;
        self.next_timer += 1;
        self.scheduled_resend = Some(timer);
        debug!(timer, delay = ?self.config.resend_delay, "Scheduling token re-send");
        effects.push(Effect::ScheduleResend {
            timer,
            after: self.config.resend_delay,
        });
    }

    fn on_resend_due(&mut self, timer: u64, effects: &mut Vec<Effect>) {
        if self.scheduled_resend != Some(timer) {
            debug!(timer, "Dropping superseded re-send");
            return;
        }
        self.scheduled_resend = None;

        if self.is_delivered() {
            return;
        }
        info!(generation = self.generation, "Re-sending tokens");
        self.deliver_or_buffer(effects);
    }

    fn on_readiness_timeout(&mut self, generation: u64, effects: &mut Vec<Effect>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Dropping stale readiness timeout");
            return;
        }
        if !self.page_transition(PageMachineInput::ProbeTimedOut) {
            return;
        }

        warn!(
            generation,
            ceiling = ?self.config.readiness_ceiling(),
            tokens_pending = self.pending.is_some(),
            "Page never signalled readiness"
        );
        effects.push(Effect::Notify(SessionNotice::ReadinessTimedOut {
            tokens_pending: self.pending.is_some(),
        }));
    }

    fn on_resend_requested(&mut self, effects: &mut Vec<Effect>) {
        if self.tokens.is_none() {
            info!("Nothing to re-send, not logged in");
            return;
        }

        self.scheduled_resend = None;
        if self.is_page_ready() {
            if self.is_delivered() {
                self.page_transition(PageMachineInput::TokensSuperseded);
            }
            info!(generation = self.generation, "Manual re-send");
            self.deliver_or_buffer(effects);
        } else {
            // Page never proved ready; start it over with the tokens buffered.
            info!(state = ?self.handoff_state(), "Manual re-send, reloading page first");
            self.deliver_or_buffer(effects);
            effects.push(Effect::ReloadPage);
        }
    }
}
