//! Per-domain counters reported by the hypervisor.
//!
//! All counters are cumulative since domain creation. Rates are derived
//! later by comparing two snapshots (see [`crate::rates`]).

use serde::{Deserialize, Serialize};

/// Maximum memory value meaning "no limit".
pub const UNLIMITED_MEMORY: u64 = u64::MAX;

/// Execution state of a domain.
///
/// A domain may report several flags at once. The order of
/// [`DomainState::PRIORITY`] decides both sorting and the displayed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainState {
    Dying,
    Shutdown,
    Blocked,
    Crashed,
    Paused,
    Running,
}

impl DomainState {
    /// Highest priority first.
    pub const PRIORITY: [DomainState; 6] = [
        DomainState::Dying,
        DomainState::Shutdown,
        DomainState::Blocked,
        DomainState::Crashed,
        DomainState::Paused,
        DomainState::Running,
    ];

    /// Single-letter abbreviation used in the STATE column.
    pub fn letter(self) -> char {
        match self {
            DomainState::Dying => 'd',
            DomainState::Shutdown => 's',
            DomainState::Blocked => 'b',
            DomainState::Crashed => 'c',
            DomainState::Paused => 'p',
            DomainState::Running => 'r',
        }
    }
}

/// State flags as reported by the hypervisor (not mutually exclusive).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DomainFlags {
    pub dying: bool,
    pub shutdown: bool,
    pub blocked: bool,
    pub crashed: bool,
    pub paused: bool,
    pub running: bool,
}

impl DomainFlags {
    /// Flags with only `running` set.
    pub fn running() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// Flags with only `blocked` set.
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    pub fn has(&self, state: DomainState) -> bool {
        match state {
            DomainState::Dying => self.dying,
            DomainState::Shutdown => self.shutdown,
            DomainState::Blocked => self.blocked,
            DomainState::Crashed => self.crashed,
            DomainState::Paused => self.paused,
            DomainState::Running => self.running,
        }
    }

    /// Letter shown in the STATE column.
    ///
    /// The last set flag in priority order wins; `-` when nothing is set.
    pub fn letter(&self) -> char {
        DomainState::PRIORITY
            .iter()
            .rev()
            .find(|s| self.has(**s))
            .map_or('-', |s| s.letter())
    }

    /// State bucket used by the node summary counters.
    ///
    /// Unlike [`DomainFlags::letter`] this checks running first, then
    /// blocked, paused, shutdown, crashed and dying.
    pub fn summary_state(&self) -> Option<DomainState> {
        [
            DomainState::Running,
            DomainState::Blocked,
            DomainState::Paused,
            DomainState::Shutdown,
            DomainState::Crashed,
            DomainState::Dying,
        ]
        .into_iter()
        .find(|s| self.has(*s))
    }
}

/// Virtual CPU of a domain.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct VcpuInfo {
    /// Whether the VCPU is online.
    pub online: bool,
    /// Cumulative CPU time consumed by this VCPU (nanoseconds).
    pub ns: u64,
}

/// Virtual network interface counters.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NetworkInfo {
    pub rbytes: u64,
    pub rpackets: u64,
    pub rerrs: u64,
    pub rdrop: u64,
    pub tbytes: u64,
    pub tpackets: u64,
    pub terrs: u64,
    pub tdrop: u64,
}

/// Backend driver serving a virtual block device.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum VbdKind {
    #[default]
    Unidentified,
    BlkBack,
    BlkTap,
}

impl VbdKind {
    pub fn label(self) -> &'static str {
        match self {
            VbdKind::Unidentified => "Unidentified",
            VbdKind::BlkBack => "BlkBack",
            VbdKind::BlkTap => "BlkTap",
        }
    }
}

/// Virtual block device counters.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct VbdInfo {
    pub kind: VbdKind,
    /// Device number (old-style encoding: major in bits 8.., minor in bits 0..8).
    pub dev: u32,
    /// Out-of-request events.
    pub oo_reqs: u64,
    pub rd_reqs: u64,
    pub wr_reqs: u64,
    pub rd_sects: u64,
    pub wr_sects: u64,
}

impl VbdInfo {
    pub fn major(&self) -> u32 {
        self.dev >> 8
    }

    pub fn minor(&self) -> u32 {
        self.dev & 0xff
    }
}

/// Transcendent memory counters.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TmemInfo {
    pub curr_eph_pages: u64,
    pub succ_eph_gets: u64,
    pub succ_pers_puts: u64,
    pub succ_pers_gets: u64,
}

impl TmemInfo {
    pub fn is_zero(&self) -> bool {
        (self.curr_eph_pages | self.succ_eph_gets | self.succ_pers_puts | self.succ_pers_gets) == 0
    }
}

/// Network traffic direction for summed counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetDirection {
    Rx,
    Tx,
}

/// Block device counter selector for summed counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VbdCounter {
    OutOfRequests,
    ReadRequests,
    WriteRequests,
    ReadSectors,
    WriteSectors,
}

/// One monitored domain.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Domain {
    /// Stable domain id, used to match the domain across snapshots.
    pub id: u32,
    pub name: String,
    pub flags: DomainFlags,
    /// Cumulative CPU time (nanoseconds).
    pub cpu_ns: u64,
    /// Current memory (bytes).
    pub cur_mem: u64,
    /// Maximum memory (bytes), [`UNLIMITED_MEMORY`] when unbounded.
    pub max_mem: u64,
    /// Security id.
    pub ssid: u32,
    pub vcpus: Vec<VcpuInfo>,
    pub networks: Vec<NetworkInfo>,
    pub vbds: Vec<VbdInfo>,
    pub tmem: Option<TmemInfo>,
}

impl Domain {
    pub fn num_vcpus(&self) -> usize {
        self.vcpus.len()
    }

    pub fn has_memory_limit(&self) -> bool {
        self.max_mem != UNLIMITED_MEMORY
    }

    /// Sum of received or transmitted bytes across all interfaces, saturating
    /// at `u64::MAX`.
    pub fn total_net_bytes(&self, direction: NetDirection) -> u64 {
        self.networks
            .iter()
            .map(|n| match direction {
                NetDirection::Rx => n.rbytes,
                NetDirection::Tx => n.tbytes,
            })
            .fold(0u64, |acc, v| acc.saturating_add(v))
    }

    /// Sum of one block device counter across all devices.
    pub fn total_vbd(&self, counter: VbdCounter) -> u64 {
        self.vbds
            .iter()
            .map(|v| match counter {
                VbdCounter::OutOfRequests => v.oo_reqs,
                VbdCounter::ReadRequests => v.rd_reqs,
                VbdCounter::WriteRequests => v.wr_reqs,
                VbdCounter::ReadSectors => v.rd_sects,
                VbdCounter::WriteSectors => v.wr_sects,
            })
            .fold(0u64, |acc, v| acc.saturating_add(v))
    }
}
