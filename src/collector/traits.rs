//! Abstraction over the hypervisor statistics source.
//!
//! The `StatsBackend` trait lets the monitor run against a recorded session
//! or a simulated node the same way it would against a live hypervisor.

use crate::error::BackendError;
use crate::model::Snapshot;

/// Source of node snapshots.
///
/// Construction is initialization: constructors return `Result` and a
/// backend that exists is ready to fetch. Snapshots are owned values, so
/// releasing one is dropping it.
pub trait StatsBackend {
    /// Captures the current state of the node and all of its domains.
    ///
    /// Returns [`BackendError::Exhausted`] when a finite source has nothing
    /// left to report.
    fn fetch_snapshot(&mut self) -> Result<Snapshot, BackendError>;

    /// Releases backend resources. Called once when the monitor stops.
    fn shutdown(&mut self) {}
}

impl<B: StatsBackend + ?Sized> StatsBackend for Box<B> {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, BackendError> {
        (**self).fetch_snapshot()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
