//! Controller-scoped UI state with self-expiring flags

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tracing::debug;

use crate::timers::scheduler::{Scheduler, TimerHandle};

/// Boolean flags a controller exposes to its template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiFlag {
    /// Busy indicator while an operation is in flight
    Request,

    /// Success banner of a delete
    SuccessDelete,

    /// Failure banner of a delete
    FailedDelete,
}

impl UiFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiFlag::Request => "request",
            UiFlag::SuccessDelete => "success_delete",
            UiFlag::FailedDelete => "failed_delete",
        }
    }
}

/// Snapshot of a controller's UI state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Banner text
    pub message: String,

    pub request: bool,

    pub success_delete: bool,

    pub failed_delete: bool,

    /// Set when the operator dismissed the alert widget
    pub alert_hidden: bool,

    pub(crate) busy_generation: u64,
}

impl UiState {
    pub fn flag(&self, flag: UiFlag) -> bool {
        match flag {
            UiFlag::Request => self.request,
            UiFlag::SuccessDelete => self.success_delete,
            UiFlag::FailedDelete => self.failed_delete,
        }
    }

    pub fn set_flag(&mut self, flag: UiFlag, value: bool) {
        match flag {
            UiFlag::Request => self.request = value,
            UiFlag::SuccessDelete => self.success_delete = value,
            UiFlag::FailedDelete => self.failed_delete = value,
        }
    }
}

/// Shared handle to a controller's UI state and its scheduler
#[derive(Debug, Clone)]
pub struct UiHandle {
    state: Arc<Mutex<UiState>>,
    scheduler: Arc<Scheduler>,
}

impl UiHandle {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self {
            state: Arc::new(Mutex::new(UiState::default())),
            scheduler,
        }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> UiState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Mutate the state under the lock
    pub fn update<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Weak reference for timer callbacks
    pub fn downgrade(&self) -> WeakUi {
        WeakUi {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Set `flag` to `value` now and back to `!value` after `duration`.
    ///
    /// Earlier timers on the same flag are not cancelled; each one fires on
    /// its own deadline.
    pub fn set_transient(&self, flag: UiFlag, value: bool, duration: Duration) -> TimerHandle {
        self.set_transient_then(flag, value, duration, || {})
    }

    /// [`Self::set_transient`], running `after` right after the reset.
    ///
    /// `after` is skipped if the state is gone by the deadline.
    pub fn set_transient_then<F>(
        &self,
        flag: UiFlag,
        value: bool,
        duration: Duration,
        after: F,
    ) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.update(|s| s.set_flag(flag, value));

        let weak = self.downgrade();
        self.scheduler.later(duration, move || {
            if weak.update(|s| s.set_flag(flag, !value)).is_some() {
                debug!("Transient flag {} reset to {}", flag.as_str(), !value);
                after();
            }
        })
    }

    /// Operator dismissal of the failure banner.
    ///
    /// Pending timers are left alone; if one fires later it writes the same
    /// cleared value.
    pub fn close_alert(&self) {
        self.update(|s| {
            s.failed_delete = false;
            s.alert_hidden = true;
        });
    }
}

/// Weak counterpart of [`UiHandle`]; turns into a no-op once the controller is gone
#[derive(Debug, Clone)]
pub struct WeakUi {
    state: Weak<Mutex<UiState>>,
}

impl WeakUi {
    /// Mutate the state if it is still alive
    pub fn update<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> Option<R> {
        let state = self.state.upgrade()?;
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        Some(f(&mut guard))
    }
}
