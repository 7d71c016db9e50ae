// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation of Unix signals into [`Control`] requests

use qw_engine::Control;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

/// SIGCONT, whose number differs between Linux and the BSD family
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
const SIGCONT: i32 = 19;
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
const SIGCONT: i32 = 18;

/// Signals the daemons listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Term,
    Int,
    Quit,
    Usr1,
    Usr2,
    Cont,
}

impl ControlSignal {
    fn kind(self) -> SignalKind {
        match self {
            ControlSignal::Term => SignalKind::terminate(),
            ControlSignal::Int => SignalKind::interrupt(),
            ControlSignal::Quit => SignalKind::quit(),
            ControlSignal::Usr1 => SignalKind::user_defined1(),
            ControlSignal::Usr2 => SignalKind::user_defined2(),
            ControlSignal::Cont => SignalKind::from_raw(SIGCONT),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ControlSignal::Term => "SIGTERM",
            ControlSignal::Int => "SIGINT",
            ControlSignal::Quit => "SIGQUIT",
            ControlSignal::Usr1 => "SIGUSR1",
            ControlSignal::Usr2 => "SIGUSR2",
            ControlSignal::Cont => "SIGCONT",
        }
    }
}

/// Which process the signals drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Worker,
    Scheduler,
}

/// Apply one received signal to `control`
pub fn apply(role: Role, received: ControlSignal, control: &Control) {
    tracing::info!(signal = received.name(), ?role, "received signal");
    match (role, received) {
        (Role::Worker, ControlSignal::Term | ControlSignal::Int) => control.shutdown_now(),
        (Role::Worker, ControlSignal::Quit) => control.shutdown(),
        (Role::Worker, ControlSignal::Usr1) => control.kill_child(),
        (Role::Worker, ControlSignal::Usr2) => control.pause(),
        (Role::Worker, ControlSignal::Cont) => control.resume(),
        (Role::Scheduler, ControlSignal::Term | ControlSignal::Int | ControlSignal::Quit) => {
            control.shutdown()
        }
        (Role::Scheduler, _) => {}
    }
}

/// Forward worker signals to `control` until the task is aborted
pub fn spawn_worker_signals(control: Control) -> std::io::Result<JoinHandle<()>> {
    let mut term = signal(ControlSignal::Term.kind())?;
    let mut int = signal(ControlSignal::Int.kind())?;
    let mut quit = signal(ControlSignal::Quit.kind())?;
    let mut usr1 = signal(ControlSignal::Usr1.kind())?;
    let mut usr2 = signal(ControlSignal::Usr2.kind())?;
    let mut cont = signal(ControlSignal::Cont.kind())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = term.recv() => ControlSignal::Term,
                Some(()) = int.recv() => ControlSignal::Int,
                Some(()) = quit.recv() => ControlSignal::Quit,
                Some(()) = usr1.recv() => ControlSignal::Usr1,
                Some(()) = usr2.recv() => ControlSignal::Usr2,
                Some(()) = cont.recv() => ControlSignal::Cont,
                else => break,
            };
            apply(Role::Worker, received, &control);
        }
    }))
}

/// Forward scheduler signals to `control` until the task is aborted
pub fn spawn_scheduler_signals(control: Control) -> std::io::Result<JoinHandle<()>> {
    let mut term = signal(ControlSignal::Term.kind())?;
    let mut int = signal(ControlSignal::Int.kind())?;
    let mut quit = signal(ControlSignal::Quit.kind())?;

    Ok(tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = term.recv() => ControlSignal::Term,
                Some(()) = int.recv() => ControlSignal::Int,
                Some(()) = quit.recv() => ControlSignal::Quit,
                else => break,
            };
            apply(Role::Scheduler, received, &control);
        }
    }))
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
