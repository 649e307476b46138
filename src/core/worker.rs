//! # WorkerTask: one production run.
//!
//! Executes the steps of a single run of a production line, reporting to the
//! [`ObserverSet`] and the [`ActiveCounter`].
//!
//! ## Event flow
//! ```text
//! delta(+1)   (at creation, before the task is spawned)
//! progress(0)
//!   for step in 1..=N:
//!     ├─ stop requested? → status("stopped by user")                 → Stopped
//!     ├─ sleep(entropy.step_delay())
//!     ├─ entropy.fails(step)? → status("error: unexpected technical failure") → Failed
//!     └─ status("producing unit k/N") → progress(k/N*100)
//!   status("production completed successfully") → progress(100)      → Completed
//! delta(-1)   (always last, on every exit path)
//! ```
//!
//! ## Rules
//! - Cancellation is **cooperative**: checked only at the top of each step
//! - The step sleep is the only suspension point
//! - [`StepError`]s never leave the task; they become terminal statuses

use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::counter::ActiveCounter;
use crate::core::run::{RunState, RunStatus};
use crate::entropy::Entropy;
use crate::error::StepError;
use crate::events::Event;
use crate::observers::ObserverSet;

const COMPLETED_MESSAGE: &str = "production completed successfully";

/// Shared collaborators every run reports to.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) steps: u32,
    pub(crate) entropy: Arc<dyn Entropy>,
    pub(crate) counter: Arc<ActiveCounter>,
    pub(crate) observers: Arc<ObserverSet>,
}

/// State machine for a single run of a line.
pub(crate) struct WorkerTask {
    line: Arc<str>,
    ctx: WorkerContext,
    state: Arc<RunState>,
    active: ActiveGuard,
}

impl WorkerTask {
    /// Creates a run for `line` in `Running` state.
    ///
    /// The run counts as active from here on: `delta(+1)` is emitted before
    /// this returns, so it precedes every other event of the run.
    pub(crate) fn new(line: Arc<str>, ctx: WorkerContext) -> Self {
        let state = Arc::new(RunState::running());
        let active = ActiveGuard::enter(Arc::clone(&line), &ctx, Arc::clone(&state));
        Self {
            line,
            ctx,
            state,
            active,
        }
    }

    /// Shared view of this run's state.
    pub(crate) fn state(&self) -> Arc<RunState> {
        Arc::clone(&self.state)
    }

    /// Runs all steps until completion, failure, or an observed stop request.
    pub(crate) async fn run(self, token: CancellationToken) -> RunStatus {
        self.emit(Event::progress(Arc::clone(&self.line), 0.0));

        let status = match self.produce(&token).await {
            Ok(()) => {
                self.emit(Event::status(Arc::clone(&self.line), COMPLETED_MESSAGE));
                self.emit(Event::progress(Arc::clone(&self.line), 100.0));
                RunStatus::Completed
            }
            Err(err) => {
                self.emit(Event::status(Arc::clone(&self.line), err.as_message()));
                match err {
                    StepError::TechnicalFailure { step } => {
                        tracing::warn!(line = %self.line, step, "{}", err.as_label());
                        RunStatus::Failed
                    }
                    _ => RunStatus::Stopped,
                }
            }
        };

        self.state.finish_with(status);
        tracing::info!(line = %self.line, status = status.as_label(), "run finished");
        drop(self.active);
        status
    }

    async fn produce(&self, token: &CancellationToken) -> Result<(), StepError> {
        let total = self.ctx.steps;
        for step in 1..=total {
            if token.is_cancelled() {
                return Err(StepError::Canceled);
            }

            time::sleep(self.ctx.entropy.step_delay()).await;

            if self.ctx.entropy.fails(step) {
                return Err(StepError::TechnicalFailure { step });
            }

            let percent = f64::from(step) * 100.0 / f64::from(total);
            self.state.record_progress(step, percent);
            self.emit(Event::status(
                Arc::clone(&self.line),
                format!("producing unit {step}/{total}"),
            ));
            self.emit(Event::progress(Arc::clone(&self.line), percent));
        }
        Ok(())
    }

    #[inline]
    fn emit(&self, ev: Event) {
        self.ctx.observers.emit(ev);
    }
}

/// Holds one unit of the active count for the lifetime of a run.
///
/// Dropping it (normal return, unwind, or a run future that never got
/// polled) emits `delta(-1)` and decrements the counter; nothing of this run
/// is emitted afterwards.
struct ActiveGuard {
    line: Arc<str>,
    state: Arc<RunState>,
    counter: Arc<ActiveCounter>,
    observers: Arc<ObserverSet>,
}

impl ActiveGuard {
    fn enter(line: Arc<str>, ctx: &WorkerContext, state: Arc<RunState>) -> Self {
        let active = ctx.counter.increment();
        ctx.observers.emit(Event::count_delta(Arc::clone(&line), 1));
        tracing::debug!(line = %line, active, "run started");
        Self {
            line,
            state,
            counter: Arc::clone(&ctx.counter),
            observers: Arc::clone(&ctx.observers),
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if !self.state.status().is_terminal() {
            tracing::error!(line = %self.line, "run aborted without terminal state");
            self.state.finish_with(RunStatus::Failed);
        }
        self.observers
            .emit(Event::count_delta(Arc::clone(&self.line), -1));
        self.state.mark_finished();
        self.counter.decrement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedEntropy;
    use crate::observers::Observer;
    use crate::observers::recorder::{Recorded, Recorder};
    use std::time::Duration;

    fn context(entropy: ScriptedEntropy, rec: &Arc<Recorder>) -> WorkerContext {
        let observers: Vec<Arc<dyn Observer>> = vec![rec.clone()];
        WorkerContext {
            steps: 10,
            entropy: Arc::new(entropy),
            counter: Arc::new(ActiveCounter::new()),
            observers: Arc::new(ObserverSet::new(observers)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let rec = Arc::new(Recorder::default());
        let ctx = context(ScriptedEntropy::never_fail(Duration::from_secs(1)), &rec);
        let task = WorkerTask::new("A".into(), ctx.clone());
        let state = task.state();

        let status = task.run(CancellationToken::new()).await;
        ctx.observers.flush().await;

        assert_eq!(status, RunStatus::Completed);
        assert_eq!(state.status(), RunStatus::Completed);
        assert!(state.is_finished());
        assert_eq!(ctx.counter.value(), 0);

        let per_step: Vec<f64> = (1..=10).map(|k| f64::from(k) * 10.0).collect();
        let mut expected = vec![0.0];
        expected.extend(per_step);
        expected.push(100.0);
        assert_eq!(rec.progress("A"), expected);

        let statuses = rec.statuses("A");
        assert_eq!(statuses.len(), 11);
        assert_eq!(statuses[0], "producing unit 1/10");
        assert_eq!(statuses[9], "producing unit 10/10");
        assert_eq!(statuses[10], "production completed successfully");
        assert_eq!(rec.deltas(), vec![1, -1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_at_step_four() {
        let rec = Arc::new(Recorder::default());
        let ctx = context(
            ScriptedEntropy::never_fail(Duration::from_secs(1)).fail_at(4),
            &rec,
        );
        let task = WorkerTask::new("A".into(), ctx.clone());
        let state = task.state();

        let status = task.run(CancellationToken::new()).await;
        ctx.observers.flush().await;

        assert_eq!(status, RunStatus::Failed);
        assert_eq!(state.step(), 3);
        assert_eq!(
            rec.statuses("A"),
            vec![
                "producing unit 1/10",
                "producing unit 2/10",
                "producing unit 3/10",
                "error: unexpected technical failure",
            ]
        );
        assert_eq!(rec.progress("A"), vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(rec.events().last(), Some(&Recorded::Delta(-1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_step() {
        let rec = Arc::new(Recorder::default());
        let ctx = context(ScriptedEntropy::never_fail(Duration::from_secs(1)), &rec);
        let task = WorkerTask::new("A".into(), ctx.clone());
        let token = CancellationToken::new();
        token.cancel();

        let status = task.run(token).await;
        ctx.observers.flush().await;

        assert_eq!(status, RunStatus::Stopped);
        assert_eq!(
            rec.events(),
            vec![
                Recorded::Delta(1),
                Recorded::Progress("A".into(), 0.0),
                Recorded::Status("A".into(), "stopped by user".into()),
                Recorded::Delta(-1),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_observed_at_next_step_boundary() {
        let rec = Arc::new(Recorder::default());
        let ctx = context(ScriptedEntropy::never_fail(Duration::from_secs(1)), &rec);
        let task = WorkerTask::new("A".into(), ctx.clone());
        let token = CancellationToken::new();

        let join = tokio::spawn(task.run(token.clone()));
        // Mid-way through step 3.
        time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
        let status = join.await.unwrap();
        ctx.observers.flush().await;

        assert_eq!(status, RunStatus::Stopped);
        let statuses = rec.statuses("A");
        assert_eq!(statuses.last().map(String::as_str), Some("stopped by user"));
        assert_eq!(statuses.len(), 4, "step 3 finishes before the stop is seen");
        assert_eq!(rec.progress("A").last(), Some(&30.0));
    }

    #[tokio::test]
    async fn test_panicking_entropy_still_releases_count() {
        struct Exploding;
        impl Entropy for Exploding {
            fn step_delay(&self) -> Duration {
                panic!("entropy exhausted")
            }
            fn fails(&self, _step: u32) -> bool {
                false
            }
        }

        let rec = Arc::new(Recorder::default());
        let mut ctx = context(ScriptedEntropy::default(), &rec);
        ctx.entropy = Arc::new(Exploding);
        let task = WorkerTask::new("A".into(), ctx.clone());
        let state = task.state();

        let joined = tokio::spawn(task.run(CancellationToken::new())).await;
        ctx.observers.flush().await;

        assert!(joined.is_err());
        assert_eq!(state.status(), RunStatus::Failed);
        assert_eq!(ctx.counter.value(), 0);
        assert_eq!(rec.deltas(), vec![1, -1]);
    }
}
