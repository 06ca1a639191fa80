//! Node-wide summary shown at the top of every tick.

use crate::fmt::{format_tick_time, kib};
use crate::model::{DomainState, Sample};

/// Aggregates of one sample, already converted to display units.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeSummary {
    pub date: String,
    pub domains: usize,
    pub running: usize,
    pub blocked: usize,
    pub paused: usize,
    pub crashed: usize,
    pub dying: usize,
    pub shutdown: usize,
    pub mem_total_k: u64,
    pub mem_used_k: u64,
    pub mem_free_k: u64,
    /// `None` when the node reports no freeable memory.
    pub mem_freeable_k: Option<i64>,
    pub num_cpus: u32,
    pub cpu_mhz: u64,
}

impl NodeSummary {
    pub fn from_sample(sample: &Sample) -> Self {
        let node = &sample.snapshot.node;
        let mut summary = NodeSummary {
            date: format_tick_time(sample.taken_at),
            domains: sample.snapshot.num_domains(),
            mem_total_k: kib(node.tot_mem),
            mem_used_k: kib(node.used_mem()),
            mem_free_k: kib(node.free_mem),
            mem_freeable_k: (node.freeable_mb > 0).then(|| node.freeable_mb.saturating_mul(1024)),
            num_cpus: node.num_cpus,
            cpu_mhz: node.cpu_hz / 1_000_000,
            ..NodeSummary::default()
        };

        for domain in &sample.snapshot.domains {
            match domain.flags.summary_state() {
                Some(DomainState::Running) => summary.running += 1,
                Some(DomainState::Blocked) => summary.blocked += 1,
                Some(DomainState::Paused) => summary.paused += 1,
                Some(DomainState::Shutdown) => summary.shutdown += 1,
                Some(DomainState::Crashed) => summary.crashed += 1,
                Some(DomainState::Dying) => summary.dying += 1,
                None => {}
            }
        }

        summary
    }
}
