//! Sources of randomness for the simulation.
//!
//! A run asks its [`Entropy`] two questions per step: **how long** the step
//! takes, and **whether** it fails. Production uses [`RandomEntropy`]; tests
//! plug in [`ScriptedEntropy`] to get reproducible timing and failures.
//!
//! ## Contents
//! - [`Entropy`] the pluggable source trait
//! - [`RandomEntropy`] uniform step duration + Bernoulli failure draw
//! - [`ScriptedEntropy`] fixed step duration + failures at chosen steps
//!
//! ## Quick wiring
//! ```text
//! FactoryBuilder::with_entropy(Arc<dyn Entropy>)
//!      └─► core::worker::WorkerTask per step:
//!           - entropy.step_delay() → sleep
//!           - entropy.fails(step)  → Failed or continue
//! ```

mod random;
mod scripted;

use std::time::Duration;

pub use random::RandomEntropy;
pub use scripted::ScriptedEntropy;

/// Pluggable randomness for step timing and failure injection.
///
/// Implementations are shared across all concurrently running workers, so
/// they must be `Send + Sync` and cheap to call.
pub trait Entropy: Send + Sync + 'static {
    /// Duration of the next step.
    fn step_delay(&self) -> Duration;

    /// Whether step `step` (1-based) ends in a technical failure.
    fn fails(&self, step: u32) -> bool;
}
