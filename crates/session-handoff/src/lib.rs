//! Session controller and token handoff for the go2go WebView shell.
//!
//! The [`SessionController`] is a pure state machine: every call to
//! [`SessionController::handle`] takes one [`SessionEvent`] and returns the
//! [`Effect`]s the host must carry out. [`ShellRuntime`] is the async shell
//! around it that owns the token store, talks to the page through a
//! [`PageChannel`] and turns timer effects into delayed events.

mod controller;
mod error;
mod fsm;
mod protocol;
mod runtime;
pub mod scripts;

#[cfg(test)]
mod tests;

pub use controller::{
    Effect, HandoffConfig, LoginTicket, SessionController, SessionEvent, SessionNotice,
    SessionSnapshot,
};
pub use error::{HandoffError, HandoffResult};
pub use fsm::{
    HandoffState, PageMachine, PageMachineInput, PageMachineState, SessionMachine,
    SessionMachineInput, SessionMachineState, SessionPhase,
};
pub use protocol::{PageCommand, PageMessage};
pub use runtime::{PageChannel, ShellRuntime};
