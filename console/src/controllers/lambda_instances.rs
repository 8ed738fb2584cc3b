//! Controller behind the lambda instance list

use std::sync::{Arc, Mutex};

use api_models::LambdaInstance;
use tracing::info;

use crate::controllers::delete::{
    DeleteFsm, DeleteOutcome, DeleteService, DeleteState, DeleteTarget,
};
use crate::controllers::pagination::{Page, PaginatedCollection, PaginationState};
use crate::errors::ConsoleError;
use crate::store::records::ResourceKind;
use crate::store::resource_store::ResourceStore;
use crate::timers::scheduler::Scheduler;
use crate::ui::alert::AlertPolicies;
use crate::ui::busy::{BusyTicket, BusyTimings};
use crate::ui::state::{UiHandle, UiState};

pub const DELETE_INSTANCE_PROMPT: &str = "Are you sure you want to delete this lambda instance?";
pub const DELETE_INSTANCE_SUCCESS: &str =
    "Your request to delete the lambda instance was successfully sent to the server.";

pub struct LambdaInstancesController {
    ui: UiHandle,
    store: Arc<ResourceStore>,
    deletes: Arc<DeleteService>,
    fsm: Mutex<DeleteFsm>,
    collection: Mutex<PaginatedCollection<LambdaInstance>>,
    alerts: AlertPolicies,
    busy: BusyTimings,
}

impl LambdaInstancesController {
    pub fn new(
        store: Arc<ResourceStore>,
        deletes: Arc<DeleteService>,
        pagination: PaginationState,
        alerts: AlertPolicies,
        busy: BusyTimings,
    ) -> Self {
        Self {
            ui: UiHandle::new(Arc::new(Scheduler::new())),
            store,
            deletes,
            fsm: Mutex::new(DeleteFsm::new()),
            collection: Mutex::new(PaginatedCollection::new(Vec::new(), pagination)),
            alerts,
            busy,
        }
    }

    /// Reload the instance list from the store
    pub async fn refresh(&self) -> Result<usize, ConsoleError> {
        let instances = self.store.find_all::<LambdaInstance>().await?;
        let count = instances.len();
        self.lock_collection().set_items(instances);
        Ok(count)
    }

    pub fn set_page(&self, page: usize) -> Result<(), ConsoleError> {
        self.lock_collection().set_page(page)
    }

    pub fn set_per_page(&self, per_page: usize) -> Result<(), ConsoleError> {
        self.lock_collection().set_per_page(per_page)
    }

    /// Apply `page`/`perPage` from the view's query string
    pub fn apply_query(&self, query: &str) -> Result<(), ConsoleError> {
        self.lock_collection().apply_query(query)
    }

    pub fn query_string(&self) -> String {
        self.lock_collection().state().to_query()
    }

    pub fn paged(&self) -> Page<LambdaInstance> {
        self.lock_collection().page()
    }

    /// Delete instance `id` after confirmation; the view stays where it is
    pub async fn delete_instance(&self, id: &str) -> Result<DeleteOutcome, ConsoleError> {
        let target = DeleteTarget::new(ResourceKind::LambdaInstance, id);
        let outcome = self
            .deletes
            .run(&self.fsm, &target, DELETE_INSTANCE_PROMPT)
            .await?;

        match &outcome {
            DeleteOutcome::Cancelled => {}
            DeleteOutcome::Succeeded => {
                // The store no longer holds any instance; keep the list in step.
                self.lock_collection().set_items(Vec::new());
                self.ui.raise_success(
                    DELETE_INSTANCE_SUCCESS,
                    &self.alerts.instance_delete_success,
                    || {},
                );
            }
            DeleteOutcome::Failed(message) => {
                self.ui
                    .raise_failure(message.clone(), &self.alerts.delete_failure);
            }
        }

        Ok(outcome)
    }

    pub fn start_stop(&self) -> BusyTicket {
        info!("Start/stop requested from the instance list");
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

    fn lock_collection(&self) -> std::sync::MutexGuard<'_, PaginatedCollection<LambdaInstance>> {
        self.collection.lock().unwrap_or_else(|e| e.into_inner())
    }
}
