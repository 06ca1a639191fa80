//! Mock statistics backends for testing.
//!
//! This module provides `MockBackend` and pre-built simulated nodes for
//! running the monitor without access to a hypervisor.

mod backend;
mod scenarios;

pub use backend::MockBackend;
pub use scenarios::{Load, Simulation};
