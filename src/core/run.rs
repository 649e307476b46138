//! # Per-run state and handles.
//!
//! A [`RunState`] is written only by its own worker task and read by the
//! registry for snapshots and eligibility checks; all fields are atomics, so
//! no lock is needed.
//!
//! ## Status transitions
//! ```text
//! Idle ──► Running ──┬──► Completed
//!            │       ├──► Failed
//!            ▼       │
//!        (Stopping) ─┴──► Stopped
//! ```
//! `Stopping` is not stored: it is a `Running` run whose stop was requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle status of a line's latest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RunStatus {
    /// No run yet.
    Idle = 0,
    /// Producing units.
    Running = 1,
    /// Running, but a stop was requested and not yet observed.
    Stopping = 2,
    /// All units produced.
    Completed = 3,
    /// Ended by a technical failure.
    Failed = 4,
    /// Ended by a user stop.
    Stopped = 5,
}

impl RunStatus {
    /// True for `Completed`, `Failed` and `Stopped`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed | RunStatus::Stopped)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Stopping => "stopping",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Stopped => "stopped",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => RunStatus::Running,
            2 => RunStatus::Stopping,
            3 => RunStatus::Completed,
            4 => RunStatus::Failed,
            5 => RunStatus::Stopped,
            _ => RunStatus::Idle,
        }
    }
}

/// Atomic state of one run.
#[derive(Debug)]
pub(crate) struct RunState {
    status: AtomicU8,
    step: AtomicU32,
    progress_bits: AtomicU64,
    finished: AtomicBool,
}

impl RunState {
    /// State of a freshly created run.
    pub(crate) fn running() -> Self {
        Self {
            status: AtomicU8::new(RunStatus::Running as u8),
            step: AtomicU32::new(0),
            progress_bits: AtomicU64::new(0f64.to_bits()),
            finished: AtomicBool::new(false),
        }
    }

    pub(crate) fn status(&self) -> RunStatus {
        RunStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Moves to a terminal status; ignored if already terminal.
    pub(crate) fn finish_with(&self, status: RunStatus) {
        debug_assert!(status.is_terminal());
        let _ = self.status.fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
            (!RunStatus::from_u8(cur).is_terminal()).then_some(status as u8)
        });
    }

    /// Records a produced step; progress never moves backwards.
    pub(crate) fn record_progress(&self, step: u32, percent: f64) {
        self.step.fetch_max(step, Ordering::AcqRel);
        if percent > self.progress() {
            self.progress_bits.store(percent.to_bits(), Ordering::Release);
        }
    }

    pub(crate) fn step(&self) -> u32 {
        self.step.load(Ordering::Acquire)
    }

    pub(crate) fn progress(&self) -> f64 {
        f64::from_bits(self.progress_bits.load(Ordering::Acquire))
    }

    /// Marks that the run emitted its last event.
    pub(crate) fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

/// Registry-side handle to a spawned run.
pub(crate) struct RunHandle {
    pub(crate) state: Arc<RunState>,
    pub(crate) cancel: CancellationToken,
    pub(crate) join: Option<JoinHandle<RunStatus>>,
}

impl RunHandle {
    /// True while the run has not emitted its final count decrement.
    pub(crate) fn is_active(&self) -> bool {
        !self.state.is_finished()
    }

    /// Signals cooperative cancellation; returns false if already requested.
    pub(crate) fn request_stop(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        true
    }

    /// Observed status, deriving `Stopping` from a pending stop request.
    pub(crate) fn status(&self) -> RunStatus {
        match self.state.status() {
            RunStatus::Running if self.cancel.is_cancelled() => RunStatus::Stopping,
            s => s,
        }
    }
}

/// Point-in-time view of a production line and its latest run.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSnapshot {
    /// Line name.
    pub name: String,
    /// Status of the latest run (`Idle` if never started).
    pub status: RunStatus,
    /// Last produced unit (0 before the first one).
    pub current_step: u32,
    /// Last reported progress in `[0, 100]`.
    pub progress: f64,
    /// Whether a stop was requested for the latest run.
    pub cancel_requested: bool,
}

impl LineSnapshot {
    pub(crate) fn of(name: &str, run: Option<&RunHandle>) -> Self {
        match run {
            None => Self {
                name: name.to_string(),
                status: RunStatus::Idle,
                current_step: 0,
                progress: 0.0,
                cancel_requested: false,
            },
            Some(run) => Self {
                name: name.to_string(),
                status: run.status(),
                current_step: run.state.step(),
                progress: run.state.progress(),
                cancel_requested: run.cancel.is_cancelled(),
            },
        }
    }
}
