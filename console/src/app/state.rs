//! Shared console state and controller construction

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::app::options::ConsoleOptions;
use crate::authn::authorizer::Authorizer;
use crate::controllers::delete::{ConfirmationRequest, DeleteService};
use crate::controllers::deploy::{self, DeployController};
use crate::controllers::lambda_app::LambdaAppController;
use crate::controllers::lambda_instances::LambdaInstancesController;
use crate::controllers::navigation::Navigator;
use crate::controllers::pagination::PaginationState;
use crate::http::adapter::HttpAdapter;
use crate::http::client::Transport;
use crate::http::endpoints::ResourceEndpoint;
use crate::store::resource_store::ResourceStore;
use crate::ui::alert::AlertPolicies;
use crate::ui::busy::BusyTimings;

/// Everything controllers share: the store, the delete service, navigation
pub struct AppState {
    pub store: Arc<ResourceStore>,
    pub deletes: Arc<DeleteService>,
    pub navigator: Arc<dyn Navigator>,
    alerts: AlertPolicies,
    busy: BusyTimings,
    poller: deploy::Options,
    pagination: PaginationState,
}

impl AppState {
    /// Wire the store and the delete service on top of `transport`.
    ///
    /// Confirmations for deletes are sent to `confirmations`.
    pub fn new(
        options: &ConsoleOptions,
        transport: Arc<dyn Transport>,
        authorizer: Arc<dyn Authorizer>,
        navigator: Arc<dyn Navigator>,
        confirmations: mpsc::Sender<ConfirmationRequest>,
    ) -> Self {
        let endpoints = ResourceEndpoint::new(&options.backend_host, &options.app_namespace);
        info!("Console backend: {}", endpoints.host());

        let adapter = HttpAdapter::new(
            transport.clone(),
            authorizer.clone(),
            endpoints.clone(),
            &options.auth_scheme,
        );
        let store = Arc::new(ResourceStore::new(Arc::new(adapter)));
        let deletes = Arc::new(DeleteService::new(
            store.clone(),
            transport,
            authorizer,
            endpoints,
            &options.auth_scheme,
            confirmations,
        ));

        Self {
            store,
            deletes,
            navigator,
            alerts: options.alerts,
            busy: options.busy,
            poller: options.poller.clone(),
            pagination: options.pagination,
        }
    }

    pub fn lambda_app(&self) -> LambdaAppController {
        LambdaAppController::new(
            self.store.clone(),
            self.deletes.clone(),
            self.navigator.clone(),
            self.alerts,
            self.busy,
        )
    }

    pub fn lambda_instances(&self) -> LambdaInstancesController {
        LambdaInstancesController::new(
            self.store.clone(),
            self.deletes.clone(),
            self.pagination,
            self.alerts,
            self.busy,
        )
    }

    pub fn deploy(&self) -> DeployController {
        DeployController::new(self.store.clone(), self.poller.clone())
    }
}
