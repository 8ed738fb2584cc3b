//! Runtime options of the console

use std::time::Duration;

use secrecy::SecretString;

use crate::controllers::deploy;
use crate::controllers::pagination::{PaginationState, DEFAULT_PAGE};
use crate::errors::ConsoleError;
use crate::storage::settings::Settings;
use crate::ui::alert::AlertPolicies;
use crate::ui::busy::BusyTimings;

/// Main console options
#[derive(Debug)]
pub struct ConsoleOptions {
    /// Backend host, without trailing slash
    pub backend_host: String,

    /// Namespace of the application endpoints
    pub app_namespace: String,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Authorizer scheme
    pub auth_scheme: String,

    /// Session token
    pub token: Option<SecretString>,

    pub alerts: AlertPolicies,

    pub busy: BusyTimings,

    /// Deployment poller options
    pub poller: deploy::Options,

    /// Initial pagination of the instance list
    pub pagination: PaginationState,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            backend_host: "http://localhost:8000".to_string(),
            app_namespace: "api/apps/".to_string(),
            request_timeout: Duration::from_secs(30),
            auth_scheme: crate::authn::authorizer::DJANGO_SCHEME.to_string(),
            token: None,
            alerts: AlertPolicies::default(),
            busy: BusyTimings::default(),
            poller: deploy::Options::default(),
            pagination: PaginationState::default(),
        }
    }
}

impl ConsoleOptions {
    /// Build options from the settings file, consuming the token
    pub fn from_settings(settings: Settings) -> Result<Self, ConsoleError> {
        let busy = settings.ui.busy;
        Ok(Self {
            backend_host: settings.backend.host.trim_end_matches('/').to_string(),
            app_namespace: settings.backend.app_namespace,
            request_timeout: Duration::from_secs(settings.backend.timeout_secs),
            auth_scheme: settings.auth.scheme,
            token: settings.auth.token,
            alerts: settings.ui.alerts,
            busy,
            poller: deploy::Options {
                evaluation_delay: Duration::from_millis(settings.poller.evaluation_delay_ms),
                busy_fallback: busy.deploy,
                capacity: settings.poller.capacity,
                prune_ready: settings.poller.prune_ready,
            },
            pagination: PaginationState::new(DEFAULT_PAGE, settings.pagination.per_page)?,
        })
    }
}
