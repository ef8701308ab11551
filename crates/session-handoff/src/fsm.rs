//! Session and page-handoff state machines using rust-fsm.
//!
//! Two machines run side by side. The session machine tracks whether the
//! user is logged in; the page machine tracks one page-load instance of the
//! embedded app and whether it has confirmed receipt of the tokens.
//!
//! ## Session
//!
//! ```text
//! Initializing ──StoredSessionFound──► LoggedIn ◄─┐ LoginSucceeded
//!      │                                  │  ▲    │ (new pair)
//!      │ NoStoredSession  LogoutRequested │  └────┘
//!      ▼                                  ▼
//!  LoggedOut ◄────────────────────────────┘
//!      │ LoginSucceeded
//!      └──────────────► LoggedIn
//! ```
//!
//! ## Page handoff
//!
//! ```text
//! NotLoaded ─LoadStarted─► Loading ─LoadFinished─► Probing ─ProbeTimedOut─► Stalled
//!                             │                      │                         │
//!                             └──── ReadySignal ─────┴─────── ReadySignal ─────┘
//!                                                    ▼
//!                                                  Ready ─DeliveryAcknowledged─► Delivered
//!                                                    ▲                             │
//!                                                    └────── TokensSuperseded ─────┘
//! ```
//!
//! `LoadStarted` returns any state to `Loading`; `Teardown` returns any
//! state to `NotLoaded`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Initializing)

    Initializing => {
        StoredSessionFound => LoggedIn,
        NoStoredSession => LoggedOut
    },
    LoggedOut => {
        LoginSucceeded => LoggedIn,
        // Logout is always honoured so the store gets another clear attempt
        LogoutRequested => LoggedOut
    },
    LoggedIn => {
        LoginSucceeded => LoggedIn,
        LogoutRequested => LoggedOut
    }
}

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub page_machine(NotLoaded)

    NotLoaded => {
        LoadStarted => Loading,
        LoadFinished => Probing,
        Teardown => NotLoaded
    },
    Loading => {
        LoadStarted => Loading,
        LoadFinished => Probing,
        ReadySignal => Ready,
        Teardown => NotLoaded
    },
    Probing => {
        LoadStarted => Loading,
        LoadFinished => Probing,
        ReadySignal => Ready,
        ProbeTimedOut => Stalled,
        Teardown => NotLoaded
    },
    Stalled => {
        LoadStarted => Loading,
        LoadFinished => Probing,
        ReadySignal => Ready,
        Teardown => NotLoaded
    },
    Ready => {
        LoadStarted => Loading,
        LoadFinished => Ready,
        ReadySignal => Ready,
        DeliveryAcknowledged => Delivered,
        TokensSuperseded => Ready,
        Teardown => NotLoaded
    },
    Delivered => {
        LoadStarted => Loading,
        LoadFinished => Delivered,
        ReadySignal => Delivered,
        DeliveryAcknowledged => Delivered,
        TokensSuperseded => Ready,
        Teardown => NotLoaded
    }
}

pub use page_machine::Input as PageMachineInput;
pub use page_machine::State as PageMachineState;
pub use page_machine::StateMachine as PageMachine;
pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Session phase for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Initializing,
    LoggedOut,
    LoggedIn,
}

impl SessionPhase {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionPhase::LoggedIn)
    }
}

impl From<&SessionMachineState> for SessionPhase {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Initializing => SessionPhase::Initializing,
            SessionMachineState::LoggedOut => SessionPhase::LoggedOut,
            SessionMachineState::LoggedIn => SessionPhase::LoggedIn,
        }
    }
}

/// Page handoff state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffState {
    /// No page instance.
    NotLoaded,
    /// Page is loading.
    Loading,
    /// Load finished, readiness probe running.
    Probing,
    /// Probe gave up without a readiness signal.
    Stalled,
    /// Page can accept a delivery.
    Ready,
    /// Page acknowledged the current token pair.
    Delivered,
}

impl HandoffState {
    pub fn is_page_ready(&self) -> bool {
        matches!(self, HandoffState::Ready | HandoffState::Delivered)
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, HandoffState::Delivered)
    }
}

impl From<&PageMachineState> for HandoffState {
    fn from(state: &PageMachineState) -> Self {
        match state {
            PageMachineState::NotLoaded => HandoffState::NotLoaded,
            PageMachineState::Loading => HandoffState::Loading,
            PageMachineState::Probing => HandoffState::Probing,
            PageMachineState::Stalled => HandoffState::Stalled,
            PageMachineState::Ready => HandoffState::Ready,
            PageMachineState::Delivered => HandoffState::Delivered,
        }
    }
}
