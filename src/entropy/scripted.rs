//! # Deterministic entropy source.
//!
//! [`ScriptedEntropy`] returns a fixed step duration and fails exactly at the
//! steps it was told to. Used by tests and demos that need reproducible runs.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use linevisor::{Entropy, ScriptedEntropy};
//!
//! let e = ScriptedEntropy::never_fail(Duration::from_millis(10)).fail_at(4);
//! assert!(!e.fails(3));
//! assert!(e.fails(4));
//! assert_eq!(e.step_delay(), Duration::from_millis(10));
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use super::Entropy;

/// Fixed step delay and an explicit set of failing steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptedEntropy {
    delay: Duration,
    fail_steps: BTreeSet<u32>,
}

impl ScriptedEntropy {
    /// Source that never fails; every step takes `delay`.
    pub fn never_fail(delay: Duration) -> Self {
        Self {
            delay,
            fail_steps: BTreeSet::new(),
        }
    }

    /// Adds `step` (1-based) to the set of failing steps.
    #[must_use]
    pub fn fail_at(mut self, step: u32) -> Self {
        self.fail_steps.insert(step);
        self
    }
}

impl Entropy for ScriptedEntropy {
    fn step_delay(&self) -> Duration {
        self.delay
    }

    fn fails(&self, step: u32) -> bool {
        self.fail_steps.contains(&step)
    }
}
