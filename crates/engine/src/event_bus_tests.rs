// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;

fn worker_event(id: &WorkerId) -> Event<'_> {
    Event::Worker(id)
}

fn recorder(
    log: &Arc<Mutex<Vec<&'static str>>>,
    name: &'static str,
) -> impl Fn(&Event<'_>) -> Result<(), HookError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |_: &Event<'_>| {
        log.lock().push(name);
        Ok(())
    }
}

#[test]
fn handlers_run_in_registration_order() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.listen(Hook::BeforeFork, recorder(&log, "first"));
    bus.listen(Hook::BeforeFork, recorder(&log, "second"));
    bus.listen(Hook::AfterFork, recorder(&log, "other-hook"));

    let id = WorkerId::new("host:1:q");
    bus.trigger(Hook::BeforeFork, &worker_event(&id)).unwrap();

    assert_eq!(*log.lock(), vec!["first", "second"]);
}

#[test]
fn trigger_without_listeners_is_ok() {
    let bus = EventBus::new();
    let id = WorkerId::new("host:1:q");
    assert_eq!(bus.trigger(Hook::OnFailure, &worker_event(&id)), Ok(()));
}

#[test]
fn handlers_receive_the_event() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(None));
    {
        let seen = Arc::clone(&seen);
        bus.listen(Hook::BeforeFirstFork, move |event| {
            if let Event::Worker(id) = event {
                *seen.lock() = Some(id.to_string());
            }
            Ok(())
        });
    }
    let id = WorkerId::new("host:7:jobs");
    bus.trigger(Hook::BeforeFirstFork, &worker_event(&id)).unwrap();
    assert_eq!(seen.lock().as_deref(), Some("host:7:jobs"));
}

#[yare::parameterized(
    do_not_create  = { HookError::DoNotCreate, true },
    do_not_perform = { HookError::DoNotPerform, true },
    failed         = { HookError::Failed("boom".to_string()), false },
)]
fn first_error_stops_remaining_handlers(error: HookError, veto: bool) {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let error = error.clone();
        bus.listen(Hook::BeforePerform, move |_| Err(error.clone()));
    }
    bus.listen(Hook::BeforePerform, recorder(&log, "after-veto"));

    let id = WorkerId::new("host:1:q");
    let result = bus.trigger(Hook::BeforePerform, &worker_event(&id));

    assert_eq!(result, Err(error.clone()));
    assert_eq!(error.is_veto(), veto);
    assert!(log.lock().is_empty());
}

#[test]
fn stop_listening_removes_exact_handler() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = bus.listen(Hook::AfterEnqueue, recorder(&log, "first"));
    bus.listen(Hook::AfterEnqueue, recorder(&log, "second"));

    assert!(bus.stop_listening(Hook::AfterEnqueue, &first));
    assert!(!bus.stop_listening(Hook::AfterEnqueue, &first));
    assert!(!bus.stop_listening(Hook::BeforeEnqueue, &first));

    let id = WorkerId::new("host:1:q");
    bus.trigger(Hook::AfterEnqueue, &worker_event(&id)).unwrap();
    assert_eq!(*log.lock(), vec!["second"]);
}

#[test]
fn clear_listeners_resets_registry() {
    let bus = EventBus::new();
    let clone = bus.clone();
    bus.listen(Hook::OnFailure, |_| Ok(()));
    assert_eq!(clone.listener_count(Hook::OnFailure), 1);

    clone.clear_listeners();
    assert_eq!(bus.listener_count(Hook::OnFailure), 0);
}

#[test]
fn handler_may_register_during_trigger() {
    let bus = EventBus::new();
    {
        let inner = bus.clone();
        bus.listen(Hook::BeforeFork, move |_| {
            inner.listen(Hook::AfterFork, |_| Ok(()));
            Ok(())
        });
    }
    let id = WorkerId::new("host:1:q");
    bus.trigger(Hook::BeforeFork, &worker_event(&id)).unwrap();
    assert_eq!(bus.listener_count(Hook::AfterFork), 1);
}

#[test]
fn hook_names_match_wire_names() {
    assert_eq!(Hook::BeforeDelayedEnqueue.to_string(), "beforeDelayedEnqueue");
    assert_eq!(Hook::OnFailure.name(), "onFailure");
}
