//! Re-send policy.
//!
//! - A router error before confirmation schedules exactly one delayed re-send
//! - Router errors after confirmation schedule nothing
//! - Repeated router errors coalesce behind the outstanding re-send
//! - Superseded re-send timers are dropped
//! - Manual re-send delivers on a ready page and reloads otherwise

use super::harness::{deliveries, pair, scheduled_resend, TestHarness};
use crate::{Effect, HandoffState, SessionEvent};
use std::time::Duration;

const ROUTER_ERROR: &str = r#"{"type":"ROUTER_ERROR","error":"Minified React error #418","path":"/home"}"#;

#[test]
fn router_error_schedules_one_delayed_resend() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    assert_eq!(h.deliveries().len(), 1);

    let effects = h.page(ROUTER_ERROR);
    assert_eq!(
        effects,
        vec![Effect::ScheduleResend {
            timer: 0,
            after: Duration::from_secs(1),
        }]
    );
    assert!(h.controller.snapshot().resend_scheduled);

    let effects = h.send(SessionEvent::ResendDue { timer: 0 });
    assert_eq!(deliveries(&effects), vec![&pair(1)]);
    assert!(!h.controller.snapshot().resend_scheduled);
    assert_eq!(h.deliveries().len(), 2);
}

#[test]
fn router_error_after_confirmation_is_ignored() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    h.page("TOKEN_SAVED_SUCCESS");

    let effects = h.page(ROUTER_ERROR);
    assert!(effects.is_empty());
    assert!(!h.controller.snapshot().resend_scheduled);
}

#[test]
fn router_error_without_session_is_ignored() {
    let mut h = TestHarness::started(None);
    h.ready_page();
    assert!(h.page(ROUTER_ERROR).is_empty());
}

#[test]
fn repeated_router_errors_coalesce() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();

    let first = h.page(ROUTER_ERROR);
    let second = h.page(ROUTER_ERROR);
    assert!(scheduled_resend(&first).is_some());
    assert!(second.is_empty());

    let timer = scheduled_resend(&first).unwrap();
    h.send(SessionEvent::ResendDue { timer });
    assert_eq!(h.deliveries().len(), 2);

    // Once the re-send fired, a fresh error may schedule another
    let third = h.page(ROUTER_ERROR);
    assert_eq!(scheduled_resend(&third), Some(timer + 1));
}

#[test]
fn resend_due_after_confirmation_does_nothing() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    let timer = scheduled_resend(&h.page(ROUTER_ERROR)).unwrap();

    h.page("TOKEN_ALREADY_EXISTS");
    let effects = h.send(SessionEvent::ResendDue { timer });
    assert!(effects.is_empty());
    assert_eq!(h.deliveries().len(), 1);
}

#[test]
fn reload_drops_outstanding_resend() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    let timer = scheduled_resend(&h.page(ROUTER_ERROR)).unwrap();

    h.send(SessionEvent::PageLoadStarted);
    let effects = h.send(SessionEvent::ResendDue { timer });
    assert!(effects.is_empty());
    assert_eq!(h.deliveries().len(), 1);
}

#[test]
fn unknown_timer_is_dropped() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    assert!(h.send(SessionEvent::ResendDue { timer: 42 }).is_empty());
}

#[test]
fn manual_resend_on_ready_page_delivers_again() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    h.page("TOKEN_SAVED_SUCCESS");
    assert!(h.controller.is_delivered());

    let effects = h.send(SessionEvent::ResendRequested);
    assert_eq!(deliveries(&effects), vec![&pair(1)]);
    assert!(!h.controller.is_delivered());
    assert_eq!(h.controller.handoff_state(), HandoffState::Ready);
}

#[test]
fn manual_resend_supersedes_scheduled_resend() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    let timer = scheduled_resend(&h.page(ROUTER_ERROR)).unwrap();

    h.send(SessionEvent::ResendRequested);
    assert!(h.send(SessionEvent::ResendDue { timer }).is_empty());
    assert_eq!(h.deliveries().len(), 2);
}

#[test]
fn manual_resend_on_unready_page_reloads_with_tokens_buffered() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.load_page();

    let effects = h.send(SessionEvent::ResendRequested);
    assert_eq!(effects, vec![Effect::ReloadPage]);
    assert_eq!(h.controller.pending_tokens(), Some(&pair(1)));

    h.ready_page();
    assert_eq!(h.deliveries(), vec![&pair(1)]);
}

#[test]
fn manual_resend_without_session_does_nothing() {
    let mut h = TestHarness::started(None);
    h.ready_page();
    assert!(h.send(SessionEvent::ResendRequested).is_empty());
}
