//! Busy flag driven by explicit completion
//!
//! Starting an operation sets `request` and hands out a [`BusyTicket`]. The
//! flag clears when the ticket is completed or, failing that, when the
//! fallback timer fires. Each start bumps a generation counter so a ticket
//! or fallback from an earlier operation never clears a newer one.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::timers::scheduler::TimerHandle;
use crate::ui::state::{UiHandle, WeakUi};

/// Fallback delays for the busy flag, per action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusyTimings {
    #[serde(with = "crate::storage::settings::millis")]
    pub deploy: Duration,

    #[serde(with = "crate::storage::settings::millis")]
    pub start_stop: Duration,

    #[serde(with = "crate::storage::settings::millis")]
    pub withdraw: Duration,
}

impl Default for BusyTimings {
    fn default() -> Self {
        Self {
            deploy: Duration::from_millis(2500),
            start_stop: Duration::from_millis(4000),
            withdraw: Duration::from_millis(2000),
        }
    }
}

/// Proof that an operation set the busy flag
#[derive(Debug)]
pub struct BusyTicket {
    ui: WeakUi,
    generation: u64,
    fallback: TimerHandle,
}

impl BusyTicket {
    /// Clear the busy flag on the real result of the operation.
    ///
    /// Returns `false` when a newer operation owns the flag (or the
    /// controller is gone) and nothing was cleared.
    pub fn complete(self) -> bool {
        self.fallback.cancel();
        clear_if_current(&self.ui, self.generation)
    }
}

impl UiHandle {
    /// Set the busy flag with a fallback clear after `fallback`
    pub fn begin_busy(&self, fallback: Duration) -> BusyTicket {
        let generation = self.update(|s| {
            s.busy_generation += 1;
            s.request = true;
            s.busy_generation
        });

        let weak = self.downgrade();
        let fallback = self.scheduler().later(fallback, move || {
            if clear_if_current(&weak, generation) {
                debug!("Busy flag cleared by fallback timer (generation {})", generation);
            }
        });

        BusyTicket {
            ui: self.downgrade(),
            generation,
            fallback,
        }
    }
}

fn clear_if_current(ui: &WeakUi, generation: u64) -> bool {
    ui.update(|s| {
        if s.busy_generation == generation && s.request {
            s.request = false;
            true
        } else {
            false
        }
    })
    .unwrap_or(false)
}
