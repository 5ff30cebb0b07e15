//! The running-tasks registry (spec §3, §5): a mapping from task name to a
//! termination signal, guarded by a single lock so the attach check-then-insert is
//! one atomic critical section.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::watch;

/// Single-producer, multi-consumer signal that flips `false -> true` exactly once,
/// when the owning supervisor finishes its terminal (CLEANING) step.
///
/// Cloning shares the same channel — any number of observers may await closure.
#[derive(Clone)]
pub struct TerminationSignal {
    rx: watch::Receiver<bool>,
}

impl TerminationSignal {
    fn new() -> (TerminationSender, Self) {
        let (tx, rx) = watch::channel(false);
        (TerminationSender { tx }, Self { rx })
    }

    /// Wait until the signal closes. Returns immediately if already closed.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }

    pub fn is_closed(&self) -> bool {
        *self.rx.borrow()
    }
}

/// The supervisor-owned half of a [`TerminationSignal`]. Closing is idempotent but is
/// only ever called once, from the supervisor's terminal step.
pub struct TerminationSender {
    tx: watch::Sender<bool>,
}

impl TerminationSender {
    pub fn close(&self) {
        let _ = self.tx.send(true);
    }
}

/// Registry of active supervisors, keyed by task name.
///
/// Entry presence is equivalent to "exactly one supervisor is responsible for this
/// task" (spec §3). Protected by a single `parking_lot::Mutex`; every critical
/// section here is O(1).
#[derive(Default)]
pub struct RunningRegistry {
    entries: Mutex<HashMap<String, TerminationSignal>>,
}

impl RunningRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check-then-insert. Returns `Some(TerminationSender)` if this call
    /// created a new entry (the caller is now responsible for the supervisor), or
    /// `None` if a supervisor was already attached (idempotent attach, spec §4.4).
    pub fn attach(&self, name: &str) -> Option<TerminationSender> {
        let mut entries = self.entries.lock();
        if entries.contains_key(name) {
            return None;
        }
        let (sender, signal) = TerminationSignal::new();
        entries.insert(name.to_string(), signal);
        Some(sender)
    }

    /// Remove the entry for `name`. Called as the last step of a supervisor's
    /// terminal sequence, after cleanup and signal closure.
    pub fn detach(&self, name: &str) {
        self.entries.lock().remove(name);
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    /// Names of all tasks currently under supervision.
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Clone of the termination signal for `name`, if a supervisor is attached.
    pub fn signal(&self, name: &str) -> Option<TerminationSignal> {
        self.entries.lock().get(name).cloned()
    }
}
