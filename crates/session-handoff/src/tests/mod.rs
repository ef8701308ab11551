//! Behaviour tests for the session controller and runtime.
//!
//! - `harness.rs`   - Controller driver, recording page channel, stub adapters
//! - `scenarios.rs` - End-to-end startup / login / logout flows
//! - `ordering.rs`  - Delivery ordering and buffering invariants
//! - `resend.rs`    - Router-error and manual re-send policy
//! - `readiness.rs` - Readiness probe, time-outs and stale timers
//! - `runtime.rs`   - Async runtime wiring: persistence, timers, notices

pub(crate) mod harness;
mod readiness;
mod resend;
mod runtime;
