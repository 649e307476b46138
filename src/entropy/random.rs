//! # Random entropy source.
//!
//! [`RandomEntropy`] draws the step duration uniformly from a closed range and
//! the failure event from a Bernoulli distribution, using the thread-local RNG.

use rand::Rng;
use std::time::Duration;

use super::Entropy;
use crate::config::Config;

/// Uniform step delay in `[min, max]` and a fixed per-step failure chance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomEntropy {
    min: Duration,
    max: Duration,
    failure_probability: f64,
}

impl RandomEntropy {
    /// Creates a source with the given delay bounds and failure probability.
    ///
    /// Bounds are swapped if given in the wrong order; the probability is
    /// clamped to `[0, 1]` (NaN becomes 0).
    pub fn new(min: Duration, max: Duration, failure_probability: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let failure_probability = if failure_probability.is_nan() {
            0.0
        } else {
            failure_probability.clamp(0.0, 1.0)
        };
        Self {
            min,
            max,
            failure_probability,
        }
    }

    /// Builds the source described by `cfg` (step range and failure chance).
    pub fn from_config(cfg: &Config) -> Self {
        let (min, max) = cfg.step_range();
        Self::new(min, max, cfg.failure_probability_clamped())
    }

    /// Returns the configured failure probability.
    pub fn failure_probability(&self) -> f64 {
        self.failure_probability
    }
}

impl Default for RandomEntropy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Entropy for RandomEntropy {
    fn step_delay(&self) -> Duration {
        let min_us = self.min.as_micros() as u64;
        let max_us = self.max.as_micros() as u64;
        if min_us >= max_us {
            return self.min;
        }
        let mut rng = rand::rng();
        Duration::from_micros(rng.random_range(min_us..=max_us))
    }

    fn fails(&self, _step: u32) -> bool {
        let mut rng = rand::rng();
        rng.random_bool(self.failure_probability)
    }
}
