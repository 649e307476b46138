//! Engine core: production runs and their lifecycle.
//!
//! The public API from this module is [`Factory`] (built with
//! [`FactoryBuilder`]), plus the read-side types [`ActiveCounter`],
//! [`LineSnapshot`] and [`RunStatus`].
//!
//! Internal modules:
//! - [`worker`]: the state machine of a single run;
//! - [`registry`]: line name → latest run, start/stop commands;
//! - [`run`]: atomic per-run state, handles, snapshots;
//! - [`counter`]: the active run counter;
//! - [`factory`] / [`builder`]: wiring and the command boundary.

mod builder;
mod counter;
mod factory;
mod registry;
mod run;
mod worker;

pub use builder::FactoryBuilder;
pub use counter::ActiveCounter;
pub use factory::Factory;
pub use run::{LineSnapshot, RunStatus};
