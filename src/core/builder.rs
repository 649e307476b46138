use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{counter::ActiveCounter, factory::Factory, registry::Registry, worker::WorkerContext};
use crate::{
    config::Config,
    entropy::{Entropy, RandomEntropy},
    observers::{Observer, ObserverSet},
};

/// Builder for constructing a [`Factory`] with optional collaborators.
pub struct FactoryBuilder {
    cfg: Config,
    observers: Vec<Arc<dyn Observer>>,
    entropy: Option<Arc<dyn Entropy>>,
}

impl FactoryBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            entropy: None,
        }
    }

    /// Sets the observers that receive status, progress and count events.
    ///
    /// Each observer gets a dedicated worker with its own queue.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observer>>) -> Self {
        self.observers = observers;
        self
    }

    /// Replaces the entropy source (defaults to [`RandomEntropy::from_config`]).
    pub fn with_entropy(mut self, entropy: Arc<dyn Entropy>) -> Self {
        self.entropy = Some(entropy);
        self
    }

    /// Builds and returns the Factory instance.
    ///
    /// Spawns the observer workers, so it must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Factory> {
        let entropy: Arc<dyn Entropy> = match self.entropy {
            Some(entropy) => entropy,
            None => Arc::new(RandomEntropy::from_config(&self.cfg)),
        };
        let counter = Arc::new(ActiveCounter::new());
        let observers = Arc::new(ObserverSet::new(self.observers));
        let runtime_token = CancellationToken::new();

        let ctx = WorkerContext {
            steps: self.cfg.steps(),
            entropy,
            counter: Arc::clone(&counter),
            observers: Arc::clone(&observers),
        };
        let registry = Registry::new(ctx, runtime_token.clone());

        Arc::new(Factory::new_internal(
            self.cfg,
            registry,
            counter,
            observers,
            runtime_token,
        ))
    }
}
