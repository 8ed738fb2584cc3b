//! Resource store: cached records, live queries, bulk eviction

pub mod live_query;
pub mod records;
pub mod resource_store;

pub use live_query::LiveQuery;
pub use records::{Resource, ResourceKind};
pub use resource_store::{ResourceAdapter, ResourceStore};
