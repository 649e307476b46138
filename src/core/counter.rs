//! # Active run counter.
//!
//! Process-wide count of runs that started and have not yet reached a terminal
//! state. Every run increments it once when it starts and decrements it once,
//! as its very last action, when it ends.
//!
//! ## Rules
//! - `increment` / `decrement` are atomic and callable from any task
//! - The value never goes below zero (a stray decrement saturates and is logged)
//! - Reads are **eventually consistent** with in-flight transitions

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Thread-safe count of active runs.
#[derive(Debug, Default)]
pub struct ActiveCounter {
    value: AtomicUsize,
    idle: Notify,
}

impl ActiveCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run start; returns the new value.
    pub fn increment(&self) -> usize {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records a run end; returns the new value.
    pub fn decrement(&self) -> usize {
        match self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1))
        {
            Ok(prev) => {
                let now = prev - 1;
                if now == 0 {
                    self.idle.notify_waiters();
                }
                now
            }
            Err(_) => {
                tracing::warn!("active counter decremented below zero; ignored");
                0
            }
        }
    }

    /// Current number of active runs.
    pub fn value(&self) -> usize {
        self.value.load(Ordering::Acquire)
    }

    /// Resolves once no run is active.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.value() == 0 {
                return;
            }
            notified.await;
        }
    }
}
