//! Backend HTTP plumbing

pub mod adapter;
pub mod client;
pub mod endpoints;
