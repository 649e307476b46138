//! # Events emitted by production runs.
//!
//! The [`EventKind`] enum mirrors the three observer callbacks:
//! - **StatusChanged**: human-readable status text for a line
//! - **ProgressChanged**: completion percentage for a line
//! - **ActiveCountDelta**: `+1` when a run starts, `-1` when it ends
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Within one run, events are created (and queued) in order.
//!
//! ## Example
//! ```rust
//! use linevisor::{Event, EventKind};
//!
//! let ev = Event::status("Line A", "producing unit 1/10");
//! assert_eq!(ev.kind, EventKind::StatusChanged);
//! assert_eq!(ev.line.as_deref(), Some("Line A"));
//! assert_eq!(ev.message.as_deref(), Some("producing unit 1/10"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Status text of a line changed.
    ///
    /// Sets:
    /// - `line`: line name
    /// - `message`: status text
    StatusChanged,

    /// Progress of a line changed.
    ///
    /// Sets:
    /// - `line`: line name
    /// - `percent`: value in `[0, 100]`
    ProgressChanged,

    /// A run started (`+1`) or reached a terminal state (`-1`).
    ///
    /// Sets:
    /// - `line`: line name of the run
    /// - `delta`: `+1` or `-1`
    ActiveCountDelta,
}

/// Engine event with optional payload.
///
/// - `seq`: monotonic global sequence for ordering
/// - payload fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the line, if applicable.
    pub line: Option<Arc<str>>,
    /// Status text.
    pub message: Option<Arc<str>>,
    /// Progress percentage.
    pub percent: Option<f64>,
    /// Active count delta.
    pub delta: Option<i32>,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            line: None,
            message: None,
            percent: None,
            delta: None,
        }
    }

    /// Attaches a line name.
    #[inline]
    pub fn with_line(mut self, line: impl Into<Arc<str>>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Attaches a status message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a progress percentage, clamped to `[0, 100]`.
    #[inline]
    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent.clamp(0.0, 100.0));
        self
    }

    /// Attaches an active count delta.
    #[inline]
    pub fn with_delta(mut self, delta: i32) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Creates a status event.
    #[inline]
    pub fn status(line: impl Into<Arc<str>>, message: impl Into<Arc<str>>) -> Self {
        Event::new(EventKind::StatusChanged)
            .with_line(line)
            .with_message(message)
    }

    /// Creates a progress event.
    #[inline]
    pub fn progress(line: impl Into<Arc<str>>, percent: f64) -> Self {
        Event::new(EventKind::ProgressChanged)
            .with_line(line)
            .with_percent(percent)
    }

    /// Creates an active count delta event.
    #[inline]
    pub fn count_delta(line: impl Into<Arc<str>>, delta: i32) -> Self {
        Event::new(EventKind::ActiveCountDelta)
            .with_line(line)
            .with_delta(delta)
    }
}
