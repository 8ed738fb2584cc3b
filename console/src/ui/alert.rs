//! Success/failure banners and their lifetimes

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::timers::scheduler::TimerHandle;
use crate::ui::state::{UiFlag, UiHandle};

/// Lifetime of one banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AlertPolicy {
    /// Time the banner stays up, and the deadline of any follow-up action
    #[serde(with = "crate::storage::settings::millis")]
    pub duration: Duration,

    /// Whether the banner clears itself at the deadline
    pub auto_clear: bool,
}

impl AlertPolicy {
    pub const fn auto(duration: Duration) -> Self {
        Self {
            duration,
            auto_clear: true,
        }
    }

    /// Banner that stays until the operator dismisses it
    pub const fn sticky() -> Self {
        Self {
            duration: Duration::ZERO,
            auto_clear: false,
        }
    }
}

/// Banner lifetimes for every console action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertPolicies {
    pub app_delete_success: AlertPolicy,
    pub instance_delete_success: AlertPolicy,
    pub delete_failure: AlertPolicy,
}

impl Default for AlertPolicies {
    fn default() -> Self {
        Self {
            app_delete_success: AlertPolicy::auto(Duration::from_millis(3000)),
            instance_delete_success: AlertPolicy::auto(Duration::from_millis(4000)),
            delete_failure: AlertPolicy::sticky(),
        }
    }
}

impl UiHandle {
    /// Show the success banner.
    ///
    /// `at_deadline` runs once `policy.duration` has elapsed, right after the
    /// banner is cleared (when the policy auto-clears). It never runs if the
    /// controller is torn down first.
    pub fn raise_success<F>(
        &self,
        message: impl Into<String>,
        policy: &AlertPolicy,
        at_deadline: F,
    ) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.show_banner(message.into(), UiFlag::SuccessDelete);

        let at_deadline = move || {
            debug!("Success banner deadline reached");
            at_deadline();
        };
        if policy.auto_clear {
            return self.set_transient_then(
                UiFlag::SuccessDelete,
                true,
                policy.duration,
                at_deadline,
            );
        }

        self.update(|s| s.success_delete = true);
        let weak = self.downgrade();
        self.scheduler().later(policy.duration, move || {
            if weak.update(|_| ()).is_some() {
                at_deadline();
            }
        })
    }

    /// Show the failure banner; it persists unless `policy` auto-clears
    pub fn raise_failure(
        &self,
        message: impl Into<String>,
        policy: &AlertPolicy,
    ) -> Option<TimerHandle> {
        self.show_banner(message.into(), UiFlag::FailedDelete);

        if !policy.auto_clear {
            self.update(|s| s.failed_delete = true);
            return None;
        }
        Some(self.set_transient(UiFlag::FailedDelete, true, policy.duration))
    }

    /// Replace the banner text and drop the opposite banner. The shown flag
    /// itself is raised by the caller.
    fn show_banner(&self, message: String, shown: UiFlag) {
        self.update(|s| {
            s.message = message;
            s.alert_hidden = false;
            match shown {
                UiFlag::SuccessDelete => s.failed_delete = false,
                UiFlag::FailedDelete => s.success_delete = false,
                UiFlag::Request => {}
            }
        });
    }
}
