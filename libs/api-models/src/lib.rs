//! Wire models shared by the console and its backend

pub mod models;

pub use models::*;
