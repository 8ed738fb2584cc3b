//! Live filtered views over the store

use std::sync::{Arc, Weak};

use tokio::sync::watch;

use crate::errors::ConsoleError;
use crate::store::records::Resource;
use crate::store::resource_store::ResourceStore;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A filter registered once and re-evaluated against the store on every read.
///
/// The query holds the store weakly; once the store is dropped or closed the
/// query reads empty and [`LiveQuery::changed`] fails.
pub struct LiveQuery<T: Resource> {
    store: Weak<ResourceStore>,
    changes: watch::Receiver<u64>,
    predicate: Predicate<T>,
}

impl<T: Resource> LiveQuery<T> {
    pub(crate) fn new(
        store: Weak<ResourceStore>,
        changes: watch::Receiver<u64>,
        predicate: Predicate<T>,
    ) -> Self {
        Self {
            store,
            changes,
            predicate,
        }
    }

    /// Records currently matching the predicate
    pub fn snapshot(&self) -> Vec<T> {
        match self.store.upgrade() {
            Some(store) => store
                .peek_all::<T>()
                .into_iter()
                .filter(|r| (self.predicate)(r))
                .collect(),
            None => Vec::new(),
        }
    }

    /// IDs of the records currently matching the predicate
    pub fn ids(&self) -> Vec<String> {
        self.snapshot().iter().map(|r| r.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for the next store mutation
    pub async fn changed(&mut self) -> Result<(), ConsoleError> {
        self.changes
            .changed()
            .await
            .map_err(|_| ConsoleError::StoreError("store dropped".to_string()))?;

        match self.store.upgrade() {
            Some(store) if !store.is_closed() => Ok(()),
            _ => Err(ConsoleError::StoreError("store closed".to_string())),
        }
    }
}

impl<T: Resource> std::fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("kind", &T::KIND)
            .field("revision", &*self.changes.borrow())
            .finish()
    }
}
