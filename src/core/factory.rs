//! # Factory: command boundary of the production engine.
//!
//! The [`Factory`] owns the line registry, the [`ActiveCounter`], the
//! [`ObserverSet`] and the runtime cancellation token. Its caller (the
//! presentation layer) issues commands; runs report back through observers.
//!
//! ## High-level architecture
//! ```text
//! Commands:
//!   add_line(name) ──► Registry (validate + insert)
//!   start_all()    ──► Registry ──► spawn WorkerTask per idle line
//!   stop_all_active() ─► Registry ──► cancel child tokens (cooperative)
//!
//! Event flow:
//!   WorkerTask ── emit(Event) ──► ObserverSet ──► [queue O1] ─► O1.on_*()
//!                                             └─► [queue ON] ─► ON.on_*()
//!
//! Shutdown path:
//!   shutdown()
//!     └─► runtime_token.cancel()  → propagates to every run token
//!     └─► wait for the active count to reach 0 within cfg.grace
//!            ├─ Ok (all ended)   → join tasks, report panics → flush observers → Ok(())
//!            └─ Timeout exceeded → flush observers → Err(GraceExceeded { stuck })
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use linevisor::{Config, Factory, LogObserver, Observer, ScriptedEntropy};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let observers: Vec<Arc<dyn Observer>> = vec![Arc::new(LogObserver::new())];
//!     let factory = Factory::builder(Config::default())
//!         .with_observers(observers)
//!         .with_entropy(Arc::new(ScriptedEntropy::never_fail(Duration::from_millis(1))))
//!         .build();
//!
//!     factory.add_line("Line A").await?;
//!     factory.start_all().await;
//!     factory.wait_idle().await;
//!     factory.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{
    builder::FactoryBuilder,
    counter::ActiveCounter,
    registry::Registry,
    run::LineSnapshot,
};
use crate::{
    config::Config,
    error::{LineError, RuntimeError},
    observers::ObserverSet,
};

/// Coordinates production lines, their runs, and observer delivery.
pub struct Factory {
    cfg: Config,
    registry: Registry,
    counter: Arc<ActiveCounter>,
    observers: Arc<ObserverSet>,
    runtime_token: CancellationToken,
}

impl Factory {
    /// Returns a builder for a factory with the given configuration.
    pub fn builder(cfg: Config) -> FactoryBuilder {
        FactoryBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        registry: Registry,
        counter: Arc<ActiveCounter>,
        observers: Arc<ObserverSet>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            registry,
            counter,
            observers,
            runtime_token,
        }
    }

    /// Registers a new production line.
    ///
    /// The name is trimmed; empty and already registered names are rejected
    /// and leave the factory unchanged.
    pub async fn add_line(&self, name: &str) -> Result<(), LineError> {
        self.registry.add_line(name).await
    }

    /// Starts a run for every line that has none active; returns how many started.
    ///
    /// Fire-and-forget: runs proceed on their own tasks. Lines already running
    /// are left untouched.
    pub async fn start_all(&self) -> usize {
        self.registry.start_all().await
    }

    /// Signals every active run to stop at its next step boundary; returns how many were signalled.
    ///
    /// Does not wait for the runs to end.
    pub async fn stop_all_active(&self) -> usize {
        self.registry.stop_all_active().await
    }

    /// Snapshots of all lines, in the order they were added.
    pub async fn lines(&self) -> Vec<LineSnapshot> {
        self.registry.lines().await
    }

    /// Snapshot of the named line, if registered.
    pub async fn line(&self, name: &str) -> Option<LineSnapshot> {
        self.registry.line(name).await
    }

    /// Current number of active runs.
    pub fn active_count(&self) -> usize {
        self.counter.value()
    }

    /// Resolves once no run is active.
    pub async fn wait_idle(&self) {
        self.counter.wait_idle().await;
    }

    /// Waits until every observer handled all events emitted so far.
    pub async fn flush(&self) {
        self.observers.flush().await;
    }

    /// Stops every run and waits up to [`Config::grace`] for them to end.
    ///
    /// After this call, [`start_all`](Self::start_all) no longer spawns runs.
    /// Observer queues are drained before returning, also on timeout.
    /// Calling it again after a timeout waits for the remaining runs anew.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        tracing::info!(active = self.counter.value(), "shutdown requested");
        self.runtime_token.cancel();

        let grace = self.cfg.grace;
        let res = match tokio::time::timeout(grace, self.counter.wait_idle()).await {
            Ok(()) => {
                self.registry.join_all().await;
                tracing::info!("all lines stopped within grace");
                Ok(())
            }
            Err(_) => {
                let stuck = self.registry.active_lines().await;
                tracing::warn!(?grace, ?stuck, "grace exceeded");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        };
        self.observers.flush().await;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run::RunStatus;
    use crate::entropy::{Entropy, ScriptedEntropy};
    use crate::observers::Observer;
    use crate::observers::recorder::{Recorded, Recorder};
    use std::time::Duration;

    fn factory(entropy: ScriptedEntropy, rec: &Arc<Recorder>) -> Arc<Factory> {
        let observers: Vec<Arc<dyn Observer>> = vec![rec.clone()];
        Factory::builder(Config::default())
            .with_observers(observers)
            .with_entropy(Arc::new(entropy))
            .build()
    }

    fn one_second() -> ScriptedEntropy {
        ScriptedEntropy::never_fail(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_add_leaves_running_line_untouched() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second(), &rec);

        f.add_line("A").await.unwrap();
        f.start_all().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let before = f.line("A").await.unwrap();

        assert!(matches!(
            f.add_line("A").await,
            Err(LineError::DuplicateName { .. })
        ));
        let after = f.line("A").await.unwrap();
        assert_eq!(before.status, RunStatus::Running);
        assert_eq!(after.status, RunStatus::Running);
        assert!(after.current_step >= before.current_step);
        assert_eq!(f.lines().await.len(), 1);
        assert_eq!(f.active_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_then_immediate_stop() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second(), &rec);

        f.add_line("A").await.unwrap();
        assert_eq!(f.start_all().await, 1);
        assert_eq!(f.stop_all_active().await, 1);
        assert_eq!(f.line("A").await.unwrap().status, RunStatus::Stopping);

        f.wait_idle().await;
        f.flush().await;

        assert_eq!(f.active_count(), 0);
        let snap = f.line("A").await.unwrap();
        assert_eq!(snap.status, RunStatus::Stopped);
        assert!(snap.cancel_requested);
        assert_eq!(rec.statuses("A"), vec!["stopped by user"]);
        assert_eq!(rec.deltas(), vec![1, -1]);
        assert_eq!(rec.events().last(), Some(&Recorded::Delta(-1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_at_step_four() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second().fail_at(4), &rec);

        f.add_line("A").await.unwrap();
        f.start_all().await;
        f.wait_idle().await;
        f.flush().await;

        let snap = f.line("A").await.unwrap();
        assert_eq!(snap.status, RunStatus::Failed);
        assert_eq!(snap.current_step, 3);
        assert_eq!(snap.progress, 30.0);
        assert_eq!(
            rec.statuses("A"),
            vec![
                "producing unit 1/10",
                "producing unit 2/10",
                "producing unit 3/10",
                "error: unexpected technical failure",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_completion() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second(), &rec);

        f.add_line("A").await.unwrap();
        f.start_all().await;
        f.wait_idle().await;
        f.flush().await;

        let snap = f.line("A").await.unwrap();
        assert_eq!(snap.status, RunStatus::Completed);
        assert_eq!(snap.current_step, 10);
        assert_eq!(snap.progress, 100.0);

        let step_progress: Vec<f64> = rec
            .progress("A")
            .into_iter()
            .filter(|p| *p > 0.0)
            .take(10)
            .collect();
        assert_eq!(step_progress.len(), 10);
        assert_eq!(step_progress.last(), Some(&100.0));
        assert_eq!(
            rec.statuses("A").last().map(String::as_str),
            Some("production completed successfully")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_line_can_be_restarted() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second().fail_at(1), &rec);

        f.add_line("A").await.unwrap();
        assert_eq!(f.start_all().await, 1);
        f.wait_idle().await;
        assert_eq!(f.line("A").await.unwrap().status, RunStatus::Failed);

        assert_eq!(f.start_all().await, 1);
        f.wait_idle().await;
        f.flush().await;

        assert_eq!(rec.deltas(), vec![1, -1, 1, -1]);
        assert_eq!(
            rec.statuses("A"),
            vec![
                "error: unexpected technical failure",
                "error: unexpected technical failure",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_lines_balance_counter_and_keep_progress_monotonic() {
        struct Alternating;
        impl Entropy for Alternating {
            fn step_delay(&self) -> Duration {
                Duration::from_millis(700)
            }
            fn fails(&self, step: u32) -> bool {
                step == 7
            }
        }

        let rec = Arc::new(Recorder::default());
        let observers: Vec<Arc<dyn Observer>> = vec![rec.clone()];
        let f = Factory::builder(Config::default())
            .with_observers(observers)
            .with_entropy(Arc::new(Alternating))
            .build();

        let names = ["A", "B", "C", "D", "E"];
        for name in names {
            f.add_line(name).await.unwrap();
        }
        assert_eq!(f.start_all().await, names.len());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.active_count(), names.len());
        assert_eq!(f.start_all().await, 0);

        f.wait_idle().await;
        f.flush().await;

        let deltas = rec.deltas();
        assert_eq!(deltas.iter().filter(|d| **d == 1).count(), names.len());
        assert_eq!(deltas.iter().sum::<i32>(), 0);
        for name in names {
            let progress = rec.progress(name);
            assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{name}: {progress:?}");
            assert_eq!(f.line(name).await.unwrap().status, RunStatus::Failed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_everything() {
        let rec = Arc::new(Recorder::default());
        let f = factory(one_second(), &rec);

        f.add_line("A").await.unwrap();
        f.add_line("B").await.unwrap();
        f.start_all().await;
        tokio::time::sleep(Duration::from_millis(2500)).await;

        f.shutdown().await.unwrap();
        assert_eq!(f.active_count(), 0);
        for snap in f.lines().await {
            assert_eq!(snap.status, RunStatus::Stopped);
        }
        assert_eq!(rec.deltas().iter().sum::<i32>(), 0);
        assert_eq!(f.start_all().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_reports_stuck_lines() {
        let rec = Arc::new(Recorder::default());
        let observers: Vec<Arc<dyn Observer>> = vec![rec.clone()];
        let cfg = Config {
            grace: Duration::from_millis(100),
            ..Config::default()
        };
        let f = Factory::builder(cfg)
            .with_observers(observers)
            .with_entropy(Arc::new(one_second()))
            .build();

        f.add_line("slow").await.unwrap();
        f.start_all().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        match f.shutdown().await {
            Err(RuntimeError::GraceExceeded { stuck, .. }) => assert_eq!(stuck, vec!["slow"]),
            other => panic!("expected GraceExceeded, got {other:?}"),
        }
        f.wait_idle().await;
        assert_eq!(f.line("slow").await.unwrap().status, RunStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_shutdown_keeps_reporting_until_runs_end() {
        let rec = Arc::new(Recorder::default());
        let observers: Vec<Arc<dyn Observer>> = vec![rec.clone()];
        let cfg = Config {
            grace: Duration::from_millis(100),
            ..Config::default()
        };
        let f = Factory::builder(cfg)
            .with_observers(observers)
            .with_entropy(Arc::new(one_second()))
            .build();

        f.add_line("slow").await.unwrap();
        f.start_all().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(matches!(
            f.shutdown().await,
            Err(RuntimeError::GraceExceeded { .. })
        ));
        match f.shutdown().await {
            Err(RuntimeError::GraceExceeded { stuck, .. }) => assert_eq!(stuck, vec!["slow"]),
            other => panic!("expected GraceExceeded while the run is active, got {other:?}"),
        }
        assert_eq!(f.active_count(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.active_count(), 0);
        f.shutdown().await.unwrap();
        assert_eq!(f.line("slow").await.unwrap().status, RunStatus::Stopped);
        assert_eq!(rec.deltas(), vec![1, -1]);
    }
}
