//! Request authorization

pub mod authorizer;
