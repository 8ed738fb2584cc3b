//! One-shot timer scheduling
//!
//! Every controller owns a [`Scheduler`]. Callbacks run on the tokio runtime
//! after their delay; dropping the scheduler aborts everything still pending,
//! which is how a torn-down controller defuses its timers.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

/// Handle to a single scheduled callback
#[derive(Debug)]
pub struct TimerHandle {
    handle: AbortHandle,
}

impl TimerHandle {
    /// Cancel the callback if it has not fired yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the callback has fired or was cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Schedules one-shot callbacks and cancels the outstanding ones on drop
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Mutex<Vec<AbortHandle>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once after `delay`.
    ///
    /// The deadline is fixed at call time, not when the task first runs.
    /// Must be called from within a tokio runtime.
    pub fn later<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        self.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback();
        })
    }

    /// Run a background task that is aborted together with the timers
    pub fn spawn<F>(&self, task: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task).abort_handle();

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle.clone());

        TimerHandle { handle }
    }

    /// Number of callbacks and tasks still pending
    pub fn pending(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Abort every callback that has not fired yet
    pub fn cancel_all(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let outstanding = pending.iter().filter(|h| !h.is_finished()).count();
        if outstanding > 0 {
            debug!("Cancelling {} pending timer(s)", outstanding);
        }
        for handle in pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
