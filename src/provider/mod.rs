//! Sampling adapter over a statistics backend.
//!
//! `SampleProvider` keeps exactly two samples alive: the current one and the
//! one before it. Each `advance` fetches a new snapshot, demotes the current
//! sample to previous and drops the old previous.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::collector::StatsBackend;
use crate::error::BackendError;
use crate::model::Sample;

/// The samples visible to one tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub current: &'a Sample,
    /// `None` on the first tick.
    pub previous: Option<&'a Sample>,
}

pub struct SampleProvider<B: StatsBackend> {
    backend: B,
    current: Option<Sample>,
    previous: Option<Sample>,
}

impl<B: StatsBackend> SampleProvider<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            previous: None,
        }
    }

    /// Fetches the next snapshot, stamped with the tick start time `now`.
    ///
    /// On failure the retained samples are left untouched.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Frame<'_>, BackendError> {
        let snapshot = self.backend.fetch_snapshot()?;
        debug!(domains = snapshot.num_domains(), "fetched snapshot");

        self.previous = self.current.take();
        let current = self.current.insert(Sample::new(snapshot, now));
        Ok(Frame {
            current,
            previous: self.previous.as_ref(),
        })
    }

    pub fn current(&self) -> Option<&Sample> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Sample> {
        self.previous.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shuts the backend down and drops the retained samples.
    pub fn shutdown(&mut self) {
        self.current = None;
        self.previous = None;
        self.backend.shutdown();
    }
}
