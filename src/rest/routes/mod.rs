//! Route handlers for the REST API.

pub mod guides;
pub mod health;
pub mod sessions;
