//! # Core observer trait
//!
//! `Observer` is the contract production runs report to. Each observer is
//! driven by a dedicated worker loop fed by its own queue inside the
//! [`ObserverSet`](crate::ObserverSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block a production run nor the
//!   other observers.
//! - Events of one line arrive in emission order. Events of different lines
//!   may interleave arbitrarily.
//! - For every run, `on_active_count_delta(+1)` arrives before any status or
//!   progress of that run, and `on_active_count_delta(-1)` arrives last.

use async_trait::async_trait;

/// Contract for receivers of status, progress and active-count notifications.
///
/// Called from an observer-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Status text of `line` changed.
    async fn on_status_changed(&self, line: &str, message: &str);

    /// Progress of `line` changed; `percent` is in `[0, 100]`.
    async fn on_progress_changed(&self, line: &str, percent: f64);

    /// A run started (`+1`) or finished (`-1`).
    async fn on_active_count_delta(&self, delta: i32);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue depth above which a backlog warning is logged.
    ///
    /// Events are never dropped: a lost `-1` would corrupt the active count.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
