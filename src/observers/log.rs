//! # LogObserver: structured event logger
//!
//! A minimal observer that writes every notification through `tracing`.
//! Keeps its own running total of active lines from the deltas it receives.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  line="Line A" status="producing unit 3/10"
//! DEBUG line="Line A" percent=30.0 progress
//! DEBUG delta=-1 active=2 active lines changed
//! ```

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::observers::Observer;

/// Event logger observer.
#[derive(Default)]
pub struct LogObserver {
    active: AtomicI64,
}

impl LogObserver {
    /// Construct a new [`LogObserver`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active lines as seen by this observer (sum of received deltas).
    pub fn active(&self) -> i64 {
        self.active.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Observer for LogObserver {
    async fn on_status_changed(&self, line: &str, message: &str) {
        tracing::info!(line, status = message);
    }

    async fn on_progress_changed(&self, line: &str, percent: f64) {
        tracing::debug!(line, percent, "progress");
    }

    async fn on_active_count_delta(&self, delta: i32) {
        let active = self.active.fetch_add(i64::from(delta), Ordering::Relaxed) + i64::from(delta);
        tracing::debug!(delta, active, "active lines changed");
    }

    fn name(&self) -> &'static str {
        "LogObserver"
    }
}
