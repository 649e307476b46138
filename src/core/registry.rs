//! # Line registry - owner of production lines and their latest runs.
//!
//! Maps each line name to its most recent run and mediates the start/stop
//! commands issued by the factory's caller.
//!
//! ## Architecture
//! ```text
//! add_line(name)     → validate → insert LineSlot { order, run: None }
//! start_all()        → for each slot (insertion order) without an active run:
//!                         WorkerTask::new ──► tokio::spawn(run(child_token))
//!                         slot.run = RunHandle { state, cancel, join }
//! stop_all_active()  → for each active run: cancel.cancel()   (no waiting)
//! join_all()         → take join handles → await → report panics
//! ```
//!
//! ## Rules
//! - At most one active run per line; a run stays active until it emitted its final `-1`
//! - Only the latest run per line is retained; a restart replaces the old handle
//! - Lines are started and listed in the order they were added
//! - Commands never wait for a run to finish

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::run::{LineSnapshot, RunHandle, RunStatus};
use crate::core::worker::{WorkerContext, WorkerTask};
use crate::error::LineError;

/// A registered line and its latest run.
struct LineSlot {
    order: usize,
    run: Option<RunHandle>,
}

impl LineSlot {
    fn is_active(&self) -> bool {
        self.run.as_ref().is_some_and(RunHandle::is_active)
    }
}

/// Registry of production lines.
pub(crate) struct Registry {
    lines: RwLock<HashMap<Arc<str>, LineSlot>>,
    ctx: WorkerContext,
    runtime_token: CancellationToken,
}

impl Registry {
    /// Creates an empty registry; every run token is a child of `runtime_token`.
    pub(crate) fn new(ctx: WorkerContext, runtime_token: CancellationToken) -> Self {
        Self {
            lines: RwLock::new(HashMap::new()),
            ctx,
            runtime_token,
        }
    }

    /// Registers a new idle line named `name` (trimmed).
    pub(crate) async fn add_line(&self, name: &str) -> Result<(), LineError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("rejected line with empty name");
            return Err(LineError::EmptyName);
        }

        let mut lines = self.lines.write().await;
        if lines.contains_key(name) {
            tracing::warn!(line = name, "rejected duplicate line");
            return Err(LineError::DuplicateName {
                name: name.to_string(),
            });
        }
        let order = lines.len();
        lines.insert(Arc::from(name), LineSlot { order, run: None });
        tracing::info!(line = name, total = lines.len(), "line added");
        Ok(())
    }

    /// Spawns a run for every line without an active one; returns how many were spawned.
    pub(crate) async fn start_all(&self) -> usize {
        if self.runtime_token.is_cancelled() {
            tracing::warn!("start ignored: factory is shutting down");
            return 0;
        }

        let mut lines = self.lines.write().await;
        let mut slots: Vec<(&Arc<str>, &mut LineSlot)> = lines.iter_mut().collect();
        slots.sort_unstable_by_key(|(_, slot)| slot.order);

        let mut spawned = 0;
        for (name, slot) in slots {
            if slot.is_active() {
                tracing::debug!(line = %name, "already running; left untouched");
                continue;
            }
            slot.run = Some(self.spawn_run(name));
            spawned += 1;
        }
        tracing::info!(spawned, "production started");
        spawned
    }

    /// Requests a stop on every active run; returns how many were newly signalled.
    pub(crate) async fn stop_all_active(&self) -> usize {
        let lines = self.lines.read().await;
        let signalled = lines
            .values()
            .filter_map(|slot| slot.run.as_ref())
            .filter(|run| run.is_active())
            .filter(|run| run.request_stop())
            .count();
        tracing::info!(signalled, "stop requested for active lines");
        signalled
    }

    /// Returns snapshots of all lines, in the order they were added.
    pub(crate) async fn lines(&self) -> Vec<LineSnapshot> {
        let lines = self.lines.read().await;
        let mut slots: Vec<_> = lines.iter().collect();
        slots.sort_unstable_by_key(|(_, slot)| slot.order);
        slots
            .into_iter()
            .map(|(name, slot)| LineSnapshot::of(name, slot.run.as_ref()))
            .collect()
    }

    /// Returns the snapshot of one line.
    pub(crate) async fn line(&self, name: &str) -> Option<LineSnapshot> {
        let lines = self.lines.read().await;
        lines
            .get_key_value(name.trim())
            .map(|(name, slot)| LineSnapshot::of(name, slot.run.as_ref()))
    }

    /// Returns names of lines with an active run, in the order they were added.
    pub(crate) async fn active_lines(&self) -> Vec<String> {
        let lines = self.lines.read().await;
        let mut active: Vec<_> = lines.iter().filter(|(_, slot)| slot.is_active()).collect();
        active.sort_unstable_by_key(|(_, slot)| slot.order);
        active.into_iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Awaits every spawned run task; panicked runs are reported.
    ///
    /// Join handles are taken out of the map, so call this only once the
    /// runs are known to have ended.
    pub(crate) async fn join_all(&self) {
        let joins: Vec<(Arc<str>, JoinHandle<RunStatus>)> = {
            let mut lines = self.lines.write().await;
            lines
                .iter_mut()
                .filter_map(|(name, slot)| {
                    let join = slot.run.as_mut()?.join.take()?;
                    Some((Arc::clone(name), join))
                })
                .collect()
        };

        for (name, join) in joins {
            if let Err(err) = join.await {
                tracing::error!(line = %name, %err, "run task panicked");
            }
        }
    }

    fn spawn_run(&self, name: &Arc<str>) -> RunHandle {
        let task = WorkerTask::new(Arc::clone(name), self.ctx.clone());
        let state = task.state();
        let cancel = self.runtime_token.child_token();
        let join = tokio::spawn(task.run(cancel.clone()));
        tracing::debug!(line = %name, "run spawned");
        RunHandle {
            state,
            cancel,
            join: Some(join),
        }
    }
}
