//! Engine events: the data model behind every observer notification.
//!
//! Workers never call observers directly. Each emission becomes an [`Event`]
//! and is handed to the [`ObserverSet`](crate::ObserverSet), which fans it
//! out to every observer's queue.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload
//!
//! ## Quick reference
//! - **Publisher**: `core::worker::WorkerTask` (status, progress, count deltas).
//! - **Consumers**: each [`Observer`](crate::Observer) via its queue worker.

mod event;

pub use event::{Event, EventKind};
