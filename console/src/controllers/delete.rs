//! Authorized delete: confirmation, request, outcome
//!
//! `Idle → Confirming → (Idle | Requesting) → (Succeeded | Failed)`.
//! Confirmation is a message to the operator surface with a reply channel,
//! so the flow can be driven without a real prompt.

use std::sync::{Arc, Mutex};

use api_models::ErrorResponse;
use http::Method;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::authn::authorizer::{collect_headers, Authorizer};
use crate::errors::ConsoleError;
use crate::http::client::{HttpResponse, Transport};
use crate::http::endpoints::ResourceEndpoint;
use crate::store::records::ResourceKind;
use crate::store::resource_store::ResourceStore;
use crate::utils::generate_request_id;

/// Failure recorded when a sent delete is abandoned before its response
pub const CANCELLED_MESSAGE: &str =
    "The delete request was cancelled before the server answered.";

/// Delete state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteState {
    /// Nothing in progress
    Idle,

    /// Waiting for the operator's decision
    Confirming,

    /// DELETE request in flight
    Requesting,

    /// Backend accepted the delete
    Succeeded,

    /// Backend or network rejected the delete
    Failed,
}

/// Delete event
#[derive(Debug, Clone)]
pub enum DeleteEvent {
    /// Delete action triggered
    Request,

    /// Operator declined
    Decline,

    /// Operator confirmed
    Confirm,

    /// Backend answered 2xx
    Succeed,

    /// Backend answered with an error, or never answered
    Fail(String),

    /// Back to idle
    Reset,
}

/// Delete FSM
#[derive(Debug, Clone)]
pub struct DeleteFsm {
    state: DeleteState,
    error: Option<String>,
}

impl DeleteFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: DeleteState::Idle,
            error: None,
        }
    }

    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    /// Message of the last failure, if the FSM is in `Failed`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a delete is waiting on the operator or the backend
    pub fn is_busy(&self) -> bool {
        matches!(self.state, DeleteState::Confirming | DeleteState::Requesting)
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeleteEvent) -> Result<(), ConsoleError> {
        let new_state = match (&self.state, &event) {
            (
                DeleteState::Idle | DeleteState::Succeeded | DeleteState::Failed,
                DeleteEvent::Request,
            ) => {
                self.error = None;
                DeleteState::Confirming
            }

            (DeleteState::Confirming, DeleteEvent::Decline) => DeleteState::Idle,
            (DeleteState::Confirming, DeleteEvent::Confirm) => DeleteState::Requesting,

            (DeleteState::Requesting, DeleteEvent::Succeed) => DeleteState::Succeeded,
            (DeleteState::Requesting, DeleteEvent::Fail(err)) => {
                self.error = Some(err.clone());
                DeleteState::Failed
            }

            (DeleteState::Succeeded | DeleteState::Failed, DeleteEvent::Reset) => {
                self.error = None;
                DeleteState::Idle
            }

            (state, event) => {
                return Err(ConsoleError::TransitionError(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for DeleteFsm {
    fn default() -> Self {
        Self::new()
    }
}

/// The operator's answer to a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Decline,
}

/// A yes/no question for the operator
#[derive(Debug)]
pub struct ConfirmationRequest {
    prompt: String,
    reply: oneshot::Sender<Decision>,
}

impl ConfirmationRequest {
    pub fn new(prompt: impl Into<String>, reply: oneshot::Sender<Decision>) -> Self {
        Self {
            prompt: prompt.into(),
            reply,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn respond(self, decision: Decision) {
        // The requester may have been torn down meanwhile.
        let _ = self.reply.send(decision);
    }

    pub fn confirm(self) {
        self.respond(Decision::Confirm);
    }

    pub fn decline(self) {
        self.respond(Decision::Decline);
    }
}

/// Channel pair connecting controllers to the operator surface
pub fn confirmation_channel(
    buffer: usize,
) -> (mpsc::Sender<ConfirmationRequest>, mpsc::Receiver<ConfirmationRequest>) {
    mpsc::channel(buffer)
}

/// Record a delete is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub kind: ResourceKind,
    pub id: String,
}

impl DeleteTarget {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// How a delete ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Operator declined; nothing was sent
    Cancelled,

    /// Backend accepted; the type's cache was evicted
    Succeeded,

    /// Request failed; carries the operator-facing message
    Failed(String),
}

/// Performs confirmed, authorized DELETE requests and evicts the cache on success
pub struct DeleteService {
    store: Arc<ResourceStore>,
    transport: Arc<dyn Transport>,
    authorizer: Arc<dyn Authorizer>,
    endpoints: ResourceEndpoint,
    auth_scheme: String,
    confirmations: mpsc::Sender<ConfirmationRequest>,
}

impl DeleteService {
    pub fn new(
        store: Arc<ResourceStore>,
        transport: Arc<dyn Transport>,
        authorizer: Arc<dyn Authorizer>,
        endpoints: ResourceEndpoint,
        auth_scheme: impl Into<String>,
        confirmations: mpsc::Sender<ConfirmationRequest>,
    ) -> Self {
        Self {
            store,
            transport,
            authorizer,
            endpoints,
            auth_scheme: auth_scheme.into(),
            confirmations,
        }
    }

    /// Run one delete through `fsm`.
    ///
    /// Errors only when `fsm` is already busy with another delete; every
    /// backend or network problem ends as [`DeleteOutcome::Failed`].
    pub async fn run(
        &self,
        fsm: &Mutex<DeleteFsm>,
        target: &DeleteTarget,
        prompt: &str,
    ) -> Result<DeleteOutcome, ConsoleError> {
        transition(fsm, DeleteEvent::Request)?;
        let guard = InFlight::new(fsm, target);

        if self.ask(prompt).await == Decision::Decline {
            info!("Delete of {} {} declined", target.kind, target.id);
            transition(fsm, DeleteEvent::Decline)?;
            guard.finish();
            return Ok(DeleteOutcome::Cancelled);
        }
        transition(fsm, DeleteEvent::Confirm)?;

        let request_id = generate_request_id();
        info!(
            "Deleting {} {} (request {})",
            target.kind, target.id, request_id
        );

        let outcome = match self.send(target).await {
            Ok(()) => {
                self.store.unload_kind(target.kind);
                transition(fsm, DeleteEvent::Succeed)?;
                info!(
                    "Delete of {} {} accepted (request {})",
                    target.kind, target.id, request_id
                );
                DeleteOutcome::Succeeded
            }
            Err(message) => {
                error!(
                    "Delete of {} {} failed (request {}): {}",
                    target.kind, target.id, request_id, message
                );
                transition(fsm, DeleteEvent::Fail(message.clone()))?;
                DeleteOutcome::Failed(message)
            }
        };
        guard.finish();
        Ok(outcome)
    }

    async fn ask(&self, prompt: &str) -> Decision {
        let (reply, decision) = oneshot::channel();
        let request = ConfirmationRequest::new(prompt, reply);

        if self.confirmations.send(request).await.is_err() {
            warn!("No operator surface to confirm the delete, treating as declined");
            return Decision::Decline;
        }
        decision.await.unwrap_or(Decision::Decline)
    }

    async fn send(&self, target: &DeleteTarget) -> Result<(), String> {
        let url = self
            .endpoints
            .member_url(target.kind, &target.id)
            .map_err(|e| e.to_string())?;
        let headers = collect_headers(self.authorizer.as_ref(), &self.auth_scheme)
            .map_err(|e| e.to_string())?;

        match self.transport.request(Method::DELETE, &url, &headers, None).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(failure_message(&response)),
            Err(e) => Err(format!("Unable to reach the server: {}", e)),
        }
    }
}

/// Operator-facing text for an error response: the first `errors[].detail`,
/// then the first `message`, then a generic line with the status.
pub fn failure_message(response: &HttpResponse) -> String {
    response
        .json::<ErrorResponse>()
        .ok()
        .and_then(|body| body.first_text().map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "The server could not process the delete request (HTTP {}).",
                response.status.as_u16()
            )
        })
}

fn transition(fsm: &Mutex<DeleteFsm>, event: DeleteEvent) -> Result<(), ConsoleError> {
    fsm.lock().unwrap_or_else(|e| e.into_inner()).process(event)
}

/// Settles the FSM when a run is dropped before it finished: a pending
/// confirmation is declined, a request in flight ends as failed.
struct InFlight<'a> {
    fsm: &'a Mutex<DeleteFsm>,
    target: String,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn new(fsm: &'a Mutex<DeleteFsm>, target: &DeleteTarget) -> Self {
        Self {
            fsm,
            target: format!("{} {}", target.kind, target.id),
            done: false,
        }
    }

    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        let mut fsm = self.fsm.lock().unwrap_or_else(|e| e.into_inner());
        let event = match fsm.state() {
            DeleteState::Confirming => DeleteEvent::Decline,
            DeleteState::Requesting => DeleteEvent::Fail(CANCELLED_MESSAGE.to_string()),
            _ => return,
        };
        warn!("Delete of {} abandoned in state {:?}", self.target, fsm.state());
        // Both events are valid from the matched states.
        let _ = fsm.process(event);
    }
}
