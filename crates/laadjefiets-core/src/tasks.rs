//! Background work tied to the lifetime of its owner.
//!
//! A view that starts requests or pollers keeps them in a `TaskGroup`; when
//! the view goes away the group is dropped and every task is aborted, so no
//! late result is applied to state that no longer exists.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TaskGroup {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.reap();
        self.handles.push((name.to_string(), tokio::spawn(future)));
    }

    /// Run `tick` immediately and then every `period` until the group is dropped.
    pub fn spawn_interval<F, Fut>(&mut self, name: &str, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn(name, async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
    }

    /// Abort every task with the given name.
    pub fn cancel(&mut self, name: &str) {
        self.handles.retain(|(task, handle)| {
            if task == name {
                handle.abort();
                false
            } else {
                true
            }
        });
    }

    pub fn abort_all(&mut self) {
        for (name, handle) in self.handles.drain(..) {
            debug!(task = %name, "Aborting task");
            handle.abort();
        }
    }

    /// Abort every task except those named `keep`.
    pub fn abort_all_except(&mut self, keep: &str) {
        self.handles.retain(|(task, handle)| {
            if task == keep {
                true
            } else {
                debug!(task = %task, "Aborting task");
                handle.abort();
                false
            }
        });
    }

    /// Number of tasks still running.
    pub fn len(&mut self) -> usize {
        self.reap();
        self.handles.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn reap(&mut self) {
        self.handles.retain(|(_, handle)| !handle.is_finished());
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.abort_all();
    }
}
