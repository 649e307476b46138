//! # Global engine configuration.
//!
//! Provides [`Config`], the centralized settings for a [`Factory`](crate::Factory).
//!
//! Config is used in two ways:
//! 1. **Factory creation**: `Factory::builder(config)`
//! 2. **Entropy defaults**: `RandomEntropy::from_config(&config)`
//!
//! ## Normalization
//! - `total_steps = 0` → treated as 1
//! - `step_min > step_max` → bounds are swapped
//! - `failure_probability` outside `[0, 1]` (or NaN) → clamped (NaN → 0)
//! - step bounds overflowing a `Duration` → saturate at `Duration::MAX`

use std::time::Duration;

/// Global configuration for the simulation engine.
///
/// ## Field semantics
/// - `total_steps`: Units produced by one complete run
/// - `time_unit`: Base duration the step bounds are expressed in
/// - `step_min` / `step_max`: Per-step duration range, in `time_unit`s
/// - `failure_probability`: Chance that a step ends in a technical failure
/// - `grace`: Maximum wait for runs to stop during [`Factory::shutdown`](crate::Factory::shutdown)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the accessors, which apply
/// the normalization rules above.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of steps (units) in a complete run.
    pub total_steps: u32,

    /// Base time unit for step durations.
    pub time_unit: Duration,

    /// Lower bound of a step duration, in time units.
    pub step_min: f64,

    /// Upper bound of a step duration, in time units.
    pub step_max: f64,

    /// Probability in `[0, 1]` that a step fails.
    pub failure_probability: f64,

    /// Maximum time to wait for active runs during shutdown.
    pub grace: Duration,
}

impl Config {
    /// Returns the number of steps per run (at least 1).
    #[inline]
    pub fn steps(&self) -> u32 {
        self.total_steps.max(1)
    }

    /// Returns the per-step duration range as `(min, max)` durations.
    ///
    /// Negative or non-finite bounds are treated as zero; bounds too large
    /// for a [`Duration`] saturate at [`Duration::MAX`].
    pub fn step_range(&self) -> (Duration, Duration) {
        let to_dur = |units: f64| {
            if units.is_finite() && units > 0.0 {
                Duration::try_from_secs_f64(self.time_unit.as_secs_f64() * units)
                    .unwrap_or(Duration::MAX)
            } else {
                Duration::ZERO
            }
        };
        let (a, b) = (to_dur(self.step_min), to_dur(self.step_max));
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Returns the failure probability clamped to `[0, 1]`.
    #[inline]
    pub fn failure_probability_clamped(&self) -> f64 {
        if self.failure_probability.is_nan() {
            0.0
        } else {
            self.failure_probability.clamp(0.0, 1.0)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `total_steps = 10`
    /// - `time_unit = 1s`, `step_min = 0.5`, `step_max = 1.5`
    /// - `failure_probability = 0.30`
    /// - `grace = 10s` (longer than any single step)
    fn default() -> Self {
        Self {
            total_steps: 10,
            time_unit: Duration::from_secs(1),
            step_min: 0.5,
            step_max: 1.5,
            failure_probability: 0.30,
            grace: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_range() {
        let cfg = Config::default();
        assert_eq!(
            cfg.step_range(),
            (Duration::from_millis(500), Duration::from_millis(1500))
        );
        assert_eq!(cfg.steps(), 10);
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let cfg = Config {
            step_min: 2.0,
            step_max: 1.0,
            time_unit: Duration::from_millis(100),
            ..Config::default()
        };
        assert_eq!(
            cfg.step_range(),
            (Duration::from_millis(100), Duration::from_millis(200))
        );
    }

    #[test]
    fn test_normalization_of_degenerate_values() {
        let cfg = Config {
            total_steps: 0,
            step_min: -1.0,
            step_max: f64::NAN,
            failure_probability: 3.0,
            ..Config::default()
        };
        assert_eq!(cfg.steps(), 1);
        assert_eq!(cfg.step_range(), (Duration::ZERO, Duration::ZERO));
        assert_eq!(cfg.failure_probability_clamped(), 1.0);

        let nan = Config {
            failure_probability: f64::NAN,
            ..Config::default()
        };
        assert_eq!(nan.failure_probability_clamped(), 0.0);
    }

    #[test]
    fn test_huge_bounds_saturate() {
        let cfg = Config {
            time_unit: Duration::MAX,
            ..Config::default()
        };
        let (min, max) = cfg.step_range();
        assert_eq!(max, Duration::MAX);
        assert!(min <= max);
    }
}
