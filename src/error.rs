//! Error types used by the linevisor engine and its production runs.
//!
//! This module defines three error enums:
//!
//! - [`LineError`]: commands rejected at the command boundary (`add_line`).
//! - [`StepError`]: conditions that end a single run; absorbed inside the worker.
//! - [`RuntimeError`]: failures of the engine itself (shutdown grace exceeded).
//!
//! All of them provide `as_label` / `as_message` helpers for logs.

use std::time::Duration;
use thiserror::Error;

/// # Errors returned by the command boundary.
///
/// Returned synchronously to the caller of `add_line`; the registry is left
/// untouched when one of these is produced.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line name was empty after trimming whitespace.
    #[error("line name is empty")]
    EmptyName,

    /// A line with this name is already registered.
    #[error("line {name:?} is already registered")]
    DuplicateName {
        /// The rejected (trimmed) name.
        name: String,
    },
}

impl LineError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use linevisor::LineError;
    ///
    /// let err = LineError::DuplicateName { name: "A".into() };
    /// assert_eq!(err.as_label(), "line_duplicate_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LineError::EmptyName => "line_empty_name",
            LineError::DuplicateName { .. } => "line_duplicate_name",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LineError::EmptyName => "empty line name".to_string(),
            LineError::DuplicateName { name } => format!("duplicate line name: {name}"),
        }
    }
}

/// # Conditions that terminate a production run.
///
/// These never leave the worker: the run converts them into a terminal
/// status plus a status message for the observers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// Simulated technical failure while producing a unit.
    #[error("unexpected technical failure at step {step}")]
    TechnicalFailure {
        /// Step (1-based) during which the failure was drawn.
        step: u32,
    },

    /// The run observed a stop request at a step boundary.
    #[error("stopped by user")]
    Canceled,
}

impl StepError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StepError::TechnicalFailure { .. } => "step_technical_failure",
            StepError::Canceled => "step_canceled",
        }
    }

    /// Returns the status message reported to observers for this condition.
    pub fn as_message(&self) -> String {
        match self {
            StepError::TechnicalFailure { .. } => "error: unexpected technical failure".to_string(),
            StepError::Canceled => "stopped by user".to_string(),
        }
    }
}

/// # Errors produced by the engine itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some runs were still active.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of lines whose runs did not finish in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use linevisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck lines={stuck:?}")
            }
        }
    }
}
