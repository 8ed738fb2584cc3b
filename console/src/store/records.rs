//! Per-type record cache

use std::sync::RwLock;

use api_models::{LambdaApplication, LambdaInstance};
use serde::de::DeserializeOwned;

use crate::store::resource_store::ResourceStore;

/// Resource types held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    LambdaInstance,
    LambdaApp,
}

impl ResourceKind {
    /// Model name used in log lines and by the backend adapter
    pub fn model_name(&self) -> &'static str {
        match self {
            ResourceKind::LambdaInstance => "lambda-instance",
            ResourceKind::LambdaApp => "lambda-app",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.model_name())
    }
}

/// A record type the store can cache
pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// The store's cache for this type
    fn records(store: &ResourceStore) -> &RecordCache<Self>;
}

impl Resource for LambdaInstance {
    const KIND: ResourceKind = ResourceKind::LambdaInstance;

    fn id(&self) -> &str {
        &self.id
    }

    fn records(store: &ResourceStore) -> &RecordCache<Self> {
        &store.instances
    }
}

impl Resource for LambdaApplication {
    const KIND: ResourceKind = ResourceKind::LambdaApp;

    fn id(&self) -> &str {
        &self.id
    }

    fn records(store: &ResourceStore) -> &RecordCache<Self> {
        &store.applications
    }
}

#[derive(Debug)]
struct Entries<T> {
    records: Vec<T>,
    loaded: bool,
}

/// Ordered records of one type plus whether a full load happened
#[derive(Debug)]
pub struct RecordCache<T> {
    entries: RwLock<Entries<T>>,
}

impl<T: Resource> RecordCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries {
                records: Vec::new(),
                loaded: false,
            }),
        }
    }

    /// Copy of every cached record, in insertion order
    pub fn all(&self) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.records.clone()
    }

    /// Whether the full collection has been fetched since the last unload
    pub fn is_loaded(&self) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.loaded
    }

    /// Replace the whole collection with a fresh load
    pub fn replace(&self, records: Vec<T>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.records = records;
        entries.loaded = true;
    }

    /// Insert a record, replacing one with the same ID
    pub fn upsert(&self, record: T) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record,
            None => entries.records.push(record),
        }
    }

    /// Drop every record and forget the load
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let evicted = entries.records.len();
        entries.records.clear();
        entries.loaded = false;
        evicted
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Resource> Default for RecordCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
