//! Readiness probe and its time-out.

use super::harness::{pair, TestHarness};
use crate::{
    Effect, HandoffConfig, HandoffState, SessionController, SessionEvent, SessionNotice,
};
use std::time::Duration;

#[test]
fn load_end_injects_probe_and_arms_timeout() {
    let mut h = TestHarness::started(Some(pair(1)));
    let effects = h.load_page();
    assert_eq!(
        effects,
        vec![
            Effect::InjectReadinessProbe,
            Effect::ScheduleReadinessTimeout {
                generation: 1,
                after: Duration::from_secs(5),
            },
        ]
    );
    assert_eq!(h.controller.handoff_state(), HandoffState::Probing);
}

#[test]
fn oversized_ceiling_saturates_instead_of_panicking() {
    let config = HandoffConfig {
        readiness_poll_interval: Duration::from_millis(u64::MAX),
        readiness_max_attempts: u32::MAX,
        ..HandoffConfig::default()
    };
    assert_eq!(config.readiness_ceiling(), Duration::MAX);

    let mut h = TestHarness {
        controller: SessionController::new(config),
        log: Vec::new(),
    };
    h.send(SessionEvent::Startup { stored: Some(pair(1)) });
    let effects = h.load_page();
    assert_eq!(
        effects[1],
        Effect::ScheduleReadinessTimeout {
            generation: 1,
            after: Duration::MAX,
        }
    );
}

#[test]
fn timeout_without_signal_stalls_and_notifies() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.load_page();

    let effects = h.send(SessionEvent::ReadinessTimedOut { generation: 1 });
    assert_eq!(
        effects,
        vec![Effect::Notify(SessionNotice::ReadinessTimedOut {
            tokens_pending: true,
        })]
    );
    assert_eq!(h.controller.handoff_state(), HandoffState::Stalled);
    assert!(h.controller.pending_tokens().is_some());
}

#[test]
fn late_ready_signal_recovers_stalled_page() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.load_page();
    h.send(SessionEvent::ReadinessTimedOut { generation: 1 });

    h.page("WEBVIEW_READY");
    assert_eq!(h.deliveries(), vec![&pair(1)]);
    assert_eq!(h.controller.handoff_state(), HandoffState::Ready);
}

#[test]
fn timeout_after_ready_is_ignored() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.ready_page();
    assert!(h
        .send(SessionEvent::ReadinessTimedOut { generation: 1 })
        .is_empty());
    assert_eq!(h.controller.handoff_state(), HandoffState::Ready);
}

#[test]
fn timeout_from_previous_load_is_ignored() {
    let mut h = TestHarness::started(Some(pair(1)));
    h.load_page();
    h.load_page();
    assert_eq!(h.controller.page_generation(), 2);

    assert!(h
        .send(SessionEvent::ReadinessTimedOut { generation: 1 })
        .is_empty());
    assert_eq!(h.controller.handoff_state(), HandoffState::Probing);
}

#[test]
fn ready_before_load_end_skips_probe() {
    let mut h = TestHarness::started(None);
    h.send(SessionEvent::PageLoadStarted);
    h.page("WEBVIEW_READY");

    let effects = h.send(SessionEvent::PageLoadFinished);
    assert!(effects.is_empty());
    assert!(h.controller.is_page_ready());
}

#[test]
fn ready_signal_without_page_is_ignored() {
    let mut h = TestHarness::started(Some(pair(1)));
    assert!(h.page("WEBVIEW_READY").is_empty());
    assert_eq!(h.controller.handoff_state(), HandoffState::NotLoaded);
    assert!(h.deliveries().is_empty());
}
