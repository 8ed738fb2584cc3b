//! Controller behind the lambda application detail view

use std::sync::{Arc, Mutex};

use api_models::LambdaInstance;
use tracing::{debug, info};

use crate::controllers::delete::{
    DeleteFsm, DeleteOutcome, DeleteService, DeleteState, DeleteTarget,
};
use crate::controllers::navigation::{Navigator, LAMBDA_APPS_ROUTE};
use crate::errors::ConsoleError;
use crate::store::records::ResourceKind;
use crate::store::resource_store::ResourceStore;
use crate::timers::scheduler::{Scheduler, TimerHandle};
use crate::ui::alert::AlertPolicies;
use crate::ui::busy::{BusyTicket, BusyTimings};
use crate::ui::state::{UiHandle, UiState};

pub const DELETE_APP_PROMPT: &str = "Are you sure you want to delete this application?";
pub const DELETE_APP_SUCCESS: &str =
    "Your request to delete the application was successfully sent to the server.";

pub struct LambdaAppController {
    ui: UiHandle,
    store: Arc<ResourceStore>,
    deletes: Arc<DeleteService>,
    navigator: Arc<dyn Navigator>,
    fsm: Mutex<DeleteFsm>,
    alerts: AlertPolicies,
    busy: BusyTimings,
}

impl LambdaAppController {
    pub fn new(
        store: Arc<ResourceStore>,
        deletes: Arc<DeleteService>,
        navigator: Arc<dyn Navigator>,
        alerts: AlertPolicies,
        busy: BusyTimings,
    ) -> Self {
        Self {
            ui: UiHandle::new(Arc::new(Scheduler::new())),
            store,
            deletes,
            navigator,
            fsm: Mutex::new(DeleteFsm::new()),
            alerts,
            busy,
        }
    }

    /// Delete application `id` after confirmation.
    ///
    /// On success the banner shows for the configured duration and the
    /// console moves to the application list at the same deadline. On
    /// failure the banner stays until [`Self::close_alert`].
    pub async fn delete_app(&self, id: &str) -> Result<DeleteOutcome, ConsoleError> {
        let target = DeleteTarget::new(ResourceKind::LambdaApp, id);
        let outcome = self.deletes.run(&self.fsm, &target, DELETE_APP_PROMPT).await?;

        match &outcome {
            DeleteOutcome::Cancelled => {}
            DeleteOutcome::Succeeded => {
                let navigator = self.navigator.clone();
                self.ui
                    .raise_success(DELETE_APP_SUCCESS, &self.alerts.app_delete_success, move || {
                        navigator.transition_to(LAMBDA_APPS_ROUTE);
                    });
            }
            DeleteOutcome::Failed(message) => {
                self.ui
                    .raise_failure(message.clone(), &self.alerts.delete_failure);
            }
        }

        Ok(outcome)
    }

    /// Withdraw the application: after the withdraw delay every cached
    /// instance is unloaded and the busy flag clears.
    pub fn withdraw(&self) -> TimerHandle {
        info!("Withdrawing application");
        let ticket = self.ui.begin_busy(self.busy.withdraw);

        let store = Arc::downgrade(&self.store);
        self.ui.scheduler().later(self.busy.withdraw, move || {
            if let Some(store) = store.upgrade() {
                store.unload_all::<LambdaInstance>();
            }
            if ticket.complete() {
                debug!("Withdraw finished");
            }
        })
    }

    /// Start or stop the application's instances; the busy flag clears on
    /// ticket completion or after the start/stop fallback.
    pub fn start_stop(&self) -> BusyTicket {
        self.ui.begin_busy(self.busy.start_stop)
    }

    pub fn close_alert(&self) {
        self.ui.close_alert();
    }

    pub fn ui(&self) -> UiState {
        self.ui.snapshot()
    }

    pub fn delete_state(&self) -> DeleteState {
        self.fsm.lock().unwrap_or_else(|e| e.into_inner()).state().clone()
    }
}
