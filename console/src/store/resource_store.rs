//! Shared store of cached backend records

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use api_models::{LambdaApplication, LambdaInstance};
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::errors::ConsoleError;
use crate::store::live_query::LiveQuery;
use crate::store::records::{RecordCache, Resource, ResourceKind};

/// Loads full collections from the backend
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Fetch every record of `kind` as raw JSON
    async fn fetch_all(
        &self,
        kind: ResourceKind,
    ) -> Result<Vec<serde_json::Value>, ConsoleError>;
}

/// Record store shared by every controller.
///
/// Each mutation bumps a revision counter that live queries follow.
pub struct ResourceStore {
    pub(crate) instances: RecordCache<LambdaInstance>,
    pub(crate) applications: RecordCache<LambdaApplication>,
    adapter: Arc<dyn ResourceAdapter>,
    revision: watch::Sender<u64>,
    closed: AtomicBool,
}

impl ResourceStore {
    /// Create a new store backed by `adapter`
    pub fn new(adapter: Arc<dyn ResourceAdapter>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            instances: RecordCache::new(),
            applications: RecordCache::new(),
            adapter,
            revision,
            closed: AtomicBool::new(false),
        }
    }

    /// Current revision; bumped by every mutation
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified on every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Refuse new queries and wake current ones so they can observe the close
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.bump();
    }

    /// Live view of the records of `T` matching `predicate`
    pub fn filter<T, P>(self: &Arc<Self>, predicate: P) -> Result<LiveQuery<T>, ConsoleError>
    where
        T: Resource,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if self.is_closed() {
            return Err(ConsoleError::StoreError(format!(
                "cannot query {} records: store is closed",
                T::KIND
            )));
        }
        Ok(LiveQuery::new(Arc::downgrade(self), self.subscribe(), Arc::new(predicate)))
    }

    /// Cached records of `T` without touching the backend
    pub fn peek_all<T: Resource>(&self) -> Vec<T> {
        T::records(self).all()
    }

    /// Add a record created locally
    pub fn create_record<T: Resource>(&self, record: T) -> T {
        T::records(self).upsert(record.clone());
        self.bump();
        record
    }

    /// Replace the cached collection of `T` with a fresh load
    pub fn push<T: Resource>(&self, records: Vec<T>) {
        debug!("Store received {} {} record(s)", records.len(), T::KIND);
        T::records(self).replace(records);
        self.bump();
    }

    /// All records of `T`, fetched through the adapter unless already loaded
    pub async fn find_all<T: Resource>(&self) -> Result<Vec<T>, ConsoleError> {
        let cache = T::records(self);
        if cache.is_loaded() {
            return Ok(cache.all());
        }

        let raw = self.adapter.fetch_all(T::KIND).await?;
        let records = raw
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        self.push(records.clone());
        Ok(records)
    }

    /// Evict every cached record of `T`
    pub fn unload_all<T: Resource>(&self) {
        self.unload_kind(T::KIND);
    }

    /// Evict every cached record of `kind`
    pub fn unload_kind(&self, kind: ResourceKind) {
        let evicted = match kind {
            ResourceKind::LambdaInstance => self.instances.clear(),
            ResourceKind::LambdaApp => self.applications.clear(),
        };
        info!("Unloaded {} cached {} record(s)", evicted, kind);
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}
