//! In-memory backend for tests and for running without a hypervisor.
//!
//! `MockBackend` either plays back a fixed script of snapshots and failures,
//! or simulates a node whose counters advance on every fetch.

use std::collections::VecDeque;

use crate::collector::traits::StatsBackend;
use crate::error::BackendError;
use crate::model::Snapshot;

use super::scenarios::Simulation;

/// One scripted fetch result.
#[derive(Debug, Clone)]
enum Step {
    Snapshot(Snapshot),
    Fail(String),
}

#[derive(Debug, Clone)]
enum Source {
    Scripted(VecDeque<Step>),
    Simulated(Simulation),
}

#[derive(Debug, Clone)]
pub struct MockBackend {
    source: Source,
    fetches: usize,
    shut_down: bool,
}

impl MockBackend {
    fn with_source(source: Source) -> Self {
        Self {
            source,
            fetches: 0,
            shut_down: false,
        }
    }

    /// Returns the given snapshots in order, then reports exhaustion.
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self::with_source(Source::Scripted(
            snapshots.into_iter().map(Step::Snapshot).collect(),
        ))
    }

    /// Returns the given snapshots, then fails with `message`.
    pub fn failing_after(snapshots: Vec<Snapshot>, message: impl Into<String>) -> Self {
        let mut backend = Self::from_snapshots(snapshots);
        if let Source::Scripted(steps) = &mut backend.source {
            steps.push_back(Step::Fail(message.into()));
        }
        backend
    }

    /// Never exhausts: every fetch returns the next simulated state.
    pub fn simulated(simulation: Simulation) -> Self {
        Self::with_source(Source::Simulated(simulation))
    }

    /// Number of fetch attempts so far, failed ones included.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl StatsBackend for MockBackend {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, BackendError> {
        self.fetches += 1;
        match &mut self.source {
            Source::Scripted(steps) => match steps.pop_front() {
                Some(Step::Snapshot(snapshot)) => Ok(snapshot),
                Some(Step::Fail(message)) => Err(BackendError::Fetch(message)),
                None => Err(BackendError::Exhausted),
            },
            Source::Simulated(simulation) => Ok(simulation.next_snapshot()),
        }
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}
