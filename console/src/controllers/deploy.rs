//! Deployment completion poller
//!
//! A deploy records its instance ID as pending and, one evaluation delay
//! later, registers a live query on the store. The query keeps the filter
//! the console has always used: ready instances (`status_code == 0`) that
//! are *not* in the pending set. After registration the poller follows
//! store revisions and reports pending instances that became ready.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use api_models::LambdaInstance;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::errors::ConsoleError;
use crate::store::live_query::LiveQuery;
use crate::store::resource_store::ResourceStore;
use crate::timers::scheduler::Scheduler;
use crate::ui::busy::BusyTicket;
use crate::ui::state::{UiHandle, UiState};

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between a deploy and the store re-evaluation
    pub evaluation_delay: Duration,

    /// Fallback clear of the busy flag
    pub busy_fallback: Duration,

    /// Maximum number of tracked instance IDs
    pub capacity: usize,

    /// Stop tracking an instance once it is observed ready
    pub prune_ready: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            evaluation_delay: Duration::from_millis(1000),
            busy_fallback: Duration::from_millis(2500),
            capacity: 256,
            prune_ready: true,
        }
    }
}

/// Instance IDs with a deploy in flight, oldest first, without duplicates.
///
/// Each ID remembers the store revision it was tracked at; readiness only
/// counts from a later revision.
#[derive(Debug, Clone)]
pub struct PendingRequestSet {
    entries: VecDeque<PendingRequest>,
    capacity: usize,
}

#[derive(Debug, Clone)]
struct PendingRequest {
    id: String,
    since_revision: u64,
}

impl PendingRequestSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Track `id` from store `revision`; returns the oldest ID if it had to
    /// be evicted. A redeploy of a tracked ID moves its revision forward.
    pub fn insert(&mut self, id: String, revision: u64) -> Option<String> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.since_revision = revision;
            return None;
        }
        self.entries.push_back(PendingRequest {
            id,
            since_revision: revision,
        });
        if self.entries.len() > self.capacity {
            return self.entries.pop_front().map(|e| e.id);
        }
        None
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Store revision `id` was tracked at
    pub fn since(&self, id: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.since_revision)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct PollerShared {
    pending: Arc<Mutex<PendingRequestSet>>,
    query: Mutex<Option<LiveQuery<LambdaInstance>>>,
    ready: Mutex<Vec<String>>,
    fault: Mutex<Option<String>>,
    prune_ready: bool,
}

impl PollerShared {
    fn fault(&self) -> Option<String> {
        self.fault.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn fail(&self, reason: String) {
        error!("Deployment poller stopped: {}", reason);
        *self.fault.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason);
    }

    /// Register the live query on first use, then look for ready instances
    fn evaluate(self: &Arc<Self>, store: &Arc<ResourceStore>, scheduler: &Scheduler) {
        {
            let mut query = self.query.lock().unwrap_or_else(|e| e.into_inner());
            if query.is_none() {
                let pending = self.pending.clone();
                let registered = store.filter::<LambdaInstance, _>(move |li| {
                    li.is_ready()
                        && !pending
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .contains(&li.id)
                });

                match registered {
                    Ok(live) => {
                        debug!("Deployment poller registered its live query");
                        *query = Some(live);
                        scheduler.spawn(follow_store(
                            Arc::downgrade(self),
                            Arc::downgrade(store),
                            store.subscribe(),
                        ));
                    }
                    Err(e) => {
                        drop(query);
                        self.fail(e.to_string());
                        return;
                    }
                }
            }
        }

        self.observe(store);
    }

    /// Record pending instances the store now reports as ready.
    ///
    /// Records cached before the deploy are stale: an instance counts only
    /// once the store moved past the revision it was tracked at.
    fn observe(&self, store: &ResourceStore) {
        let revision = store.revision();
        let instances = store.peek_all::<LambdaInstance>();
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let mut ready = self.ready.lock().unwrap_or_else(|e| e.into_inner());

        for instance in instances.iter().filter(|li| li.is_ready()) {
            match pending.since(&instance.id) {
                Some(since) if revision > since => {}
                _ => continue,
            }
            if !ready.contains(&instance.id) {
                info!("Instance {} is ready", instance.id);
                ready.push(instance.id.clone());
            }
            if self.prune_ready {
                pending.remove(&instance.id);
            }
        }
    }
}

async fn follow_store(
    shared: Weak<PollerShared>,
    store: Weak<ResourceStore>,
    mut changes: watch::Receiver<u64>,
) {
    loop {
        let changed = changes.changed().await;

        let Some(shared) = shared.upgrade() else {
            return;
        };
        let store = match (changed, store.upgrade()) {
            (Ok(()), Some(store)) if !store.is_closed() => store,
            _ => {
                shared.fail("resource store closed".to_string());
                return;
            }
        };

        shared.observe(&store);
    }
}

/// Controller behind the deploy view
pub struct DeployController {
    ui: UiHandle,
    store: Arc<ResourceStore>,
    shared: Arc<PollerShared>,
    options: Options,
}

impl DeployController {
    pub fn new(store: Arc<ResourceStore>, options: Options) -> Self {
        let shared = Arc::new(PollerShared {
            pending: Arc::new(Mutex::new(PendingRequestSet::new(options.capacity))),
            query: Mutex::new(None),
            ready: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
            prune_ready: options.prune_ready,
        });

        Self {
            ui: UiHandle::new(Arc::new(Scheduler::new())),
            store,
            shared,
            options,
        }
    }

    /// Track `instance_id` and schedule the store re-evaluation.
    ///
    /// Sets the busy flag; complete the returned ticket on the deploy's real
    /// result, otherwise the fallback timer clears it.
    pub fn on_deploy_triggered(
        &self,
        application_id: &str,
        instance_id: &str,
    ) -> Result<BusyTicket, ConsoleError> {
        if let Some(fault) = self.shared.fault() {
            return Err(ConsoleError::PollerError(fault));
        }

        info!(
            "Deploy of application {} triggered on instance {}",
            application_id, instance_id
        );

        let revision = self.store.revision();
        let evicted = self
            .shared
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(instance_id.to_string(), revision);
        if let Some(evicted) = evicted {
            warn!("Pending set full, no longer tracking instance {}", evicted);
        }
        self.shared
            .ready
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|id| id != instance_id);

        let shared = Arc::downgrade(&self.shared);
        let store = Arc::downgrade(&self.store);
        let scheduler = Arc::downgrade(self.ui.scheduler());
        self.ui
            .scheduler()
            .later(self.options.evaluation_delay, move || {
                if let (Some(shared), Some(store), Some(scheduler)) =
                    (shared.upgrade(), store.upgrade(), scheduler.upgrade())
                {
                    shared.evaluate(&store, &scheduler);
                }
            });

        Ok(self.ui.begin_busy(self.options.busy_fallback))
    }

    /// Trigger a deploy, run `request` and clear the busy flag on its result
    pub async fn deploy_with<F, T>(
        &self,
        application_id: &str,
        instance_id: &str,
        request: F,
    ) -> Result<T, ConsoleError>
    where
        F: Future<Output = Result<T, ConsoleError>>,
    {
        let ticket = self.on_deploy_triggered(application_id, instance_id)?;
        let result = request.await;
        ticket.complete();
        result
    }

    /// Current content of the live query; `None` until it is registered
    pub fn live_instances(&self) -> Option<Vec<LambdaInstance>> {
        let query = self.shared.query.lock().unwrap_or_else(|e| e.into_inner());
        query.as_ref().map(LiveQuery::snapshot)
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ids()
    }

    /// Tracked instances observed ready, in observation order
    pub fn ready_ids(&self) -> Vec<String> {
        self.shared.ready.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Reason the poller stopped, if it did
    pub fn fault(&self) -> Option<String> {
        self.shared.fault()
    }

    pub fn ui(&self) -> UiState {
        self.ui.snapshot()
    }
}
