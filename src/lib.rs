//! # linevisor
//!
//! **Linevisor** simulates independently running production lines on top of
//! tokio. Each line run advances through discrete steps, reports status and
//! progress, may fail at random, and can be cancelled cooperatively.
//!
//! The crate is the lifecycle engine only: presentation and user input live
//! behind the [`Observer`] trait (notifications out) and the [`Factory`]
//! command methods (commands in).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   add_line / start_all / stop_all_active / shutdown
//!                          │
//!                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Factory (command boundary)                                       │
//! │  - Registry (line name → latest run)                              │
//! │  - ActiveCounter (runs not yet terminal)                          │
//! │  - ObserverSet (fans out to user observers)                       │
//! │  - Entropy (step duration + failure draw)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  WorkerTask  │   │  WorkerTask  │   │  WorkerTask  │
//!     │  (line "A")  │   │  (line "B")  │   │  (line "C")  │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ delta(+1)        │                  │
//!      │ progress/status  │                  │
//!      │ delta(-1)        │                  │
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            ObserverSet (one unbounded FIFO per observer)          │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                      ┌────────────┼────────────┐
//!                      ▼            ▼            ▼
//!                   obs1.on_*    obs2.on_*    obsN.on_*
//! ```
//!
//! ### Lifecycle of one run
//! ```text
//! start_all() ──► Registry ──► tokio::spawn(WorkerTask::run(child_token))
//!
//! delta(+1), progress(0)
//! for step in 1..=N {
//!   ├─► stop requested?      ─► "stopped by user"                      ─► Stopped
//!   ├─► sleep(entropy.step_delay())
//!   ├─► entropy.fails(step)? ─► "error: unexpected technical failure"  ─► Failed
//!   └─► "producing unit k/N", progress(k/N*100)
//! }
//! "production completed successfully", progress(100)                   ─► Completed
//! delta(-1)   (always the last event of the run)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                       |
//! |-------------------|----------------------------------------------------------|------------------------------------------|
//! | **Commands**      | Register lines, start idle ones, stop active ones.       | [`Factory`], [`FactoryBuilder`]          |
//! | **Observers**     | Receive status, progress and active-count notifications. | [`Observer`], [`ObserverSet`]            |
//! | **Entropy**       | Pluggable step timing and failure injection.             | [`Entropy`], [`RandomEntropy`], [`ScriptedEntropy`] |
//! | **State**         | Snapshots of lines and the active run count.             | [`LineSnapshot`], [`RunStatus`], [`ActiveCounter`] |
//! | **Errors**        | Typed command and runtime errors.                        | [`LineError`], [`StepError`], [`RuntimeError`] |
//! | **Configuration** | Step count, timing, failure rate, shutdown grace.        | [`Config`]                               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use linevisor::{Config, Factory, LogObserver, Observer, RunStatus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.time_unit = std::time::Duration::from_millis(1);
//!     cfg.failure_probability = 0.0;
//!
//!     let observers: Vec<Arc<dyn Observer>> = vec![Arc::new(LogObserver::new())];
//!     let factory = Factory::builder(cfg).with_observers(observers).build();
//!
//!     factory.add_line("Line A").await?;
//!     factory.start_all().await;
//!     factory.wait_idle().await;
//!
//!     let line = factory.line("Line A").await.expect("registered");
//!     assert_eq!(line.status, RunStatus::Completed);
//!     factory.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod entropy;
mod error;
mod events;
mod observers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{ActiveCounter, Factory, FactoryBuilder, LineSnapshot, RunStatus};
pub use entropy::{Entropy, RandomEntropy, ScriptedEntropy};
pub use error::{LineError, RuntimeError, StepError};
pub use events::{Event, EventKind};
pub use observers::{LogObserver, Observer, ObserverSet};
