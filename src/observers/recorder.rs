//! Test observer that records every callback in arrival order.

use std::sync::Mutex;

use async_trait::async_trait;

use super::Observer;

/// One recorded callback.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Recorded {
    Status(String, String),
    Progress(String, f64),
    Delta(i32),
}

#[derive(Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<Recorded>>,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn statuses(&self, line: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Status(l, m) if l == line => Some(m),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn progress(&self, line: &str) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Progress(l, p) if l == line => Some(p),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn deltas(&self) -> Vec<i32> {
        self.events()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Delta(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn push(&self, r: Recorded) {
        self.events.lock().unwrap().push(r);
    }
}

#[async_trait]
impl Observer for Recorder {
    async fn on_status_changed(&self, line: &str, message: &str) {
        self.push(Recorded::Status(line.to_string(), message.to_string()));
    }

    async fn on_progress_changed(&self, line: &str, percent: f64) {
        self.push(Recorded::Progress(line.to_string(), percent));
    }

    async fn on_active_count_delta(&self, delta: i32) {
        self.push(Recorded::Delta(delta));
    }
}
