//! Stepguide - progressive disclosure of step-by-step guides
//!
//! Orders sparse, suffixed step identifiers ("1" < "1a" < "2" < "10"),
//! reveals one step at a time per session, and reroutes sessions around
//! steps blocked at runtime toward their alternatives.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod rest;
pub mod steps;
pub mod store;
