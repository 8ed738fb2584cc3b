//! Ephemeral UI state: transient flags, busy tickets and alert banners

pub mod alert;
pub mod busy;
pub mod state;
