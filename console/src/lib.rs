//! Lambda Console Library
//!
//! Controller layer of the lambda-on-demand web console: resource store,
//! authorized deletes, deployment polling, pagination and banner timing.

pub mod app;
pub mod authn;
pub mod controllers;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod storage;
pub mod store;
pub mod timers;
pub mod ui;
pub mod utils;

