//! Unit tests for the lambda console controllers
//!
//! These tests drive the controllers against in-memory fakes and a paused
//! tokio clock; nothing touches the network.

mod delete_flow;
mod deploy_poller;
mod pagination_properties;
mod store_refresh;
