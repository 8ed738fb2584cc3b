//! Clock and timer service

pub mod scheduler;
