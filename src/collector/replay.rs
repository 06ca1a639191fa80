//! Backend that replays a recorded session.
//!
//! A recording is a JSON array of snapshots. Each fetch returns the next
//! one; after the last, fetches report [`BackendError::Exhausted`].

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::BackendError;
use crate::model::Snapshot;

use super::traits::StatsBackend;

pub struct ReplayBackend {
    source: Option<PathBuf>,
    snapshots: VecDeque<Snapshot>,
    replayed: usize,
}

impl ReplayBackend {
    /// Loads a recording from `path`.
    ///
    /// Fails when the file cannot be read, is not a valid recording, or
    /// contains no snapshots.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| BackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshots: Vec<Snapshot> =
            serde_json::from_str(&data).map_err(|source| BackendError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if snapshots.is_empty() {
            return Err(BackendError::Init(format!(
                "recording {} contains no snapshots",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            snapshots = snapshots.len(),
            "loaded recording"
        );

        let mut backend = Self::from_snapshots(snapshots);
        backend.source = Some(path.to_path_buf());
        Ok(backend)
    }

    /// Replays snapshots held in memory.
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self {
            source: None,
            snapshots: snapshots.into(),
            replayed: 0,
        }
    }

    /// Number of snapshots not yet replayed.
    pub fn remaining(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_finished(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl StatsBackend for ReplayBackend {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, BackendError> {
        let snapshot = self.snapshots.pop_front().ok_or(BackendError::Exhausted)?;
        self.replayed += 1;
        debug!(
            position = self.replayed,
            remaining = self.snapshots.len(),
            domains = snapshot.num_domains(),
            "replaying snapshot"
        );
        Ok(snapshot)
    }

    fn shutdown(&mut self) {
        match &self.source {
            Some(path) => debug!(path = %path.display(), replayed = self.replayed, "replay finished"),
            None => debug!(replayed = self.replayed, "replay finished"),
        }
    }
}
