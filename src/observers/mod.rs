//! # Observers of the production engine.
//!
//! This module provides the [`Observer`] trait (the boundary the excluded
//! presentation layer implements), the [`ObserverSet`] fan-out that drives
//! them, and the built-in [`LogObserver`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   WorkerTask ── emit(Event) ──► ObserverSet ──► [queue O1] ─► worker O1 ─► O1.on_*()
//!                                             ├─► [queue O2] ─► worker O2 ─► O2.on_*()
//!                                             └─► [queue ON] ─► worker ON ─► ON.on_*()
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use linevisor::Observer;
//! use async_trait::async_trait;
//!
//! struct ProgressBars;
//!
//! #[async_trait]
//! impl Observer for ProgressBars {
//!     async fn on_status_changed(&self, line: &str, message: &str) {
//!         println!("{line}: {message}");
//!     }
//!     async fn on_progress_changed(&self, line: &str, percent: f64) {
//!         println!("{line}: {percent:.0}%");
//!     }
//!     async fn on_active_count_delta(&self, _delta: i32) {}
//! }
//! ```

mod log;
mod observer;
mod set;

#[cfg(test)]
pub(crate) mod recorder;

pub use log::LogObserver;
pub use observer::Observer;
pub use set::ObserverSet;
