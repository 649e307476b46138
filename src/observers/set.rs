//! # ObserverSet: non-blocking fan-out over multiple observers
//!
//! [`ObserverSet`] distributes each [`Event`] to multiple observers
//! **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(Event)` returns immediately.
//! - Per-observer FIFO (queue order), no drops.
//! - Panics inside observers are caught and logged (isolation).
//! - `flush()` resolves once every event queued before it was handled.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different observers.
//!
//! ## Diagram
//! ```text
//!    emit(Event)
//!        │                        (Arc-clone per observer)
//!        ├────────────────► [queue O1] ─► worker O1 ─► on_*()
//!        ├────────────────► [queue O2] ─► worker O2 ─► on_*()
//!        └────────────────► [queue ON] ─► worker ON ─► on_*()
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

use super::Observer;
use crate::events::{Event, EventKind};

/// Queue item: either an event or a flush marker.
enum Envelope {
    Event(Arc<Event>),
    Flush(oneshot::Sender<()>),
}

/// Per-observer channel with metadata.
struct ObserverChannel {
    name: &'static str,
    capacity: usize,
    depth: Arc<AtomicUsize>,
    sender: mpsc::UnboundedSender<Envelope>,
}

/// Composite fan-out with per-observer queues and worker tasks.
///
/// Dropping the set closes every queue; each worker exits after draining it.
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker per observer.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        let mut channels = Vec::with_capacity(observers.len());

        for obs in observers {
            let name = obs.name();
            let capacity = obs.queue_capacity().max(1);
            let depth = Arc::new(AtomicUsize::new(0));
            let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
            let depth_for_worker = Arc::clone(&depth);

            tokio::spawn(async move {
                while let Some(envelope) = rx.recv().await {
                    match envelope {
                        Envelope::Event(ev) => {
                            depth_for_worker.fetch_sub(1, Ordering::Relaxed);
                            let fut = dispatch(obs.as_ref(), ev.as_ref());
                            if let Err(panic_err) =
                                std::panic::AssertUnwindSafe(fut).catch_unwind().await
                            {
                                let any = &*panic_err;
                                let info = if let Some(msg) = any.downcast_ref::<&'static str>() {
                                    (*msg).to_string()
                                } else if let Some(msg) = any.downcast_ref::<String>() {
                                    msg.clone()
                                } else {
                                    "unknown panic".to_string()
                                };
                                tracing::error!(
                                    observer = obs.name(),
                                    seq = ev.seq,
                                    %info,
                                    "observer panicked"
                                );
                            }
                        }
                        Envelope::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            });

            channels.push(ObserverChannel {
                name,
                capacity,
                depth,
                sender: tx,
            });
        }

        Self { channels }
    }

    /// Fan-out one event to all observers (non-blocking).
    pub fn emit(&self, event: Event) {
        let ev = Arc::new(event);
        for channel in &self.channels {
            let queued = channel.depth.fetch_add(1, Ordering::Relaxed) + 1;
            if queued == channel.capacity + 1 {
                tracing::warn!(
                    observer = channel.name,
                    capacity = channel.capacity,
                    "observer queue above capacity"
                );
            }
            if channel.sender.send(Envelope::Event(Arc::clone(&ev))).is_err() {
                channel.depth.fetch_sub(1, Ordering::Relaxed);
                tracing::warn!(
                    observer = channel.name,
                    seq = ev.seq,
                    "observer worker closed; event dropped"
                );
            }
        }
    }

    /// Waits until every observer has handled all events emitted before this call.
    pub async fn flush(&self) {
        let mut acks = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let (tx, rx) = oneshot::channel();
            if channel.sender.send(Envelope::Flush(tx)).is_ok() {
                acks.push(rx);
            }
        }
        for ack in acks {
            let _ = ack.await;
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

/// Routes one event to the matching observer callback.
async fn dispatch(obs: &dyn Observer, ev: &Event) {
    let line = ev.line.as_deref().unwrap_or_default();
    match ev.kind {
        EventKind::StatusChanged => {
            obs.on_status_changed(line, ev.message.as_deref().unwrap_or_default())
                .await
        }
        EventKind::ProgressChanged => {
            obs.on_progress_changed(line, ev.percent.unwrap_or_default())
                .await
        }
        EventKind::ActiveCountDelta => {
            obs.on_active_count_delta(ev.delta.unwrap_or_default()).await
        }
    }
}
