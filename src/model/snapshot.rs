//! Node-level snapshot: one point-in-time capture of all domains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Domain;

/// Node-wide aggregates.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NodeInfo {
    /// Total physical memory (bytes).
    pub tot_mem: u64,
    /// Free physical memory (bytes).
    pub free_mem: u64,
    /// Memory that could be reclaimed (MiB). Zero or negative means none.
    pub freeable_mb: i64,
    pub num_cpus: u32,
    /// CPU clock rate (Hz).
    pub cpu_hz: u64,
}

impl NodeInfo {
    pub fn used_mem(&self) -> u64 {
        self.tot_mem.saturating_sub(self.free_mem)
    }
}

/// A point-in-time capture of the node and all of its domains.
///
/// Domains keep the order reported by the backend. Sorting for display
/// happens later and never mutates the snapshot.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Snapshot {
    pub node: NodeInfo,
    pub domains: Vec<Domain>,
}

impl Snapshot {
    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    /// Looks up a domain by id.
    pub fn domain(&self, id: u32) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }
}

/// A snapshot together with the wall-clock time its tick started.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub snapshot: Snapshot,
    pub taken_at: DateTime<Utc>,
}

impl Sample {
    pub fn new(snapshot: Snapshot, taken_at: DateTime<Utc>) -> Self {
        Self { snapshot, taken_at }
    }
}
