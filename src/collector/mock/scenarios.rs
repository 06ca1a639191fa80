//! Pre-built simulated nodes.
//!
//! A `Simulation` holds a node snapshot plus a per-domain load profile and
//! advances the cumulative counters by that profile on every fetch.

use crate::model::{
    Domain, DomainFlags, NetworkInfo, NodeInfo, Snapshot, TmemInfo, UNLIMITED_MEMORY, VbdInfo,
    VbdKind, VcpuInfo,
};
use crate::rates::NS_PER_SEC;

use super::MockBackend;

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;
const SECTORS_PER_REQUEST: u64 = 8;

/// Counter growth of one domain per fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Load {
    pub cpu_ns: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rd_reqs: u64,
    pub wr_reqs: u64,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    snapshot: Snapshot,
    /// Indexed like `snapshot.domains`; missing entries mean an idle domain.
    loads: Vec<Load>,
}

impl Simulation {
    pub fn new(snapshot: Snapshot, loads: Vec<Load>) -> Self {
        Self { snapshot, loads }
    }

    /// Returns the current state and advances the counters.
    pub fn next_snapshot(&mut self) -> Snapshot {
        let out = self.snapshot.clone();
        self.step();
        out
    }

    fn step(&mut self) {
        for (domain, load) in self.snapshot.domains.iter_mut().zip(&self.loads) {
            if !domain.flags.running && !domain.flags.blocked {
                continue;
            }
            apply_load(domain, load);
        }
    }

    /// Privileged domain plus three guests: one busy, one mostly idle and
    /// one paused.
    pub fn typical_node() -> Self {
        let node = NodeInfo {
            tot_mem: 32 * GIB,
            free_mem: 12 * GIB,
            freeable_mb: 0,
            num_cpus: 8,
            cpu_hz: 2_600_000_000,
        };

        let domains = vec![
            Domain {
                id: 0,
                name: "Domain-0".to_string(),
                flags: DomainFlags::running(),
                cpu_ns: 1_850 * NS_PER_SEC,
                cur_mem: 4 * GIB,
                max_mem: UNLIMITED_MEMORY,
                vcpus: online_vcpus(4, 460 * NS_PER_SEC),
                ..Domain::default()
            },
            Domain {
                id: 3,
                name: "web-frontend-01".to_string(),
                flags: DomainFlags::running(),
                cpu_ns: 9_320 * NS_PER_SEC,
                cur_mem: 8 * GIB,
                max_mem: 8 * GIB,
                ssid: 1,
                vcpus: online_vcpus(4, 2_330 * NS_PER_SEC),
                networks: vec![NetworkInfo {
                    rbytes: 48 * GIB,
                    rpackets: 61_000_000,
                    tbytes: 112 * GIB,
                    tpackets: 93_000_000,
                    rdrop: 17,
                    ..NetworkInfo::default()
                }],
                vbds: vec![VbdInfo {
                    kind: VbdKind::BlkBack,
                    dev: 0xca00,
                    rd_reqs: 1_200_000,
                    wr_reqs: 3_400_000,
                    rd_sects: 9_600_000,
                    wr_sects: 27_200_000,
                    ..VbdInfo::default()
                }],
                tmem: Some(TmemInfo {
                    curr_eph_pages: 512,
                    succ_eph_gets: 20_480,
                    ..TmemInfo::default()
                }),
            },
            Domain {
                id: 7,
                name: "db-replica".to_string(),
                flags: DomainFlags::blocked(),
                cpu_ns: 410 * NS_PER_SEC,
                cur_mem: 6 * GIB,
                max_mem: 12 * GIB,
                ssid: 1,
                vcpus: vec![
                    VcpuInfo {
                        online: true,
                        ns: 410 * NS_PER_SEC,
                    },
                    VcpuInfo {
                        online: false,
                        ns: 0,
                    },
                ],
                networks: vec![NetworkInfo {
                    rbytes: 900 * MIB,
                    rpackets: 1_100_000,
                    tbytes: 350 * MIB,
                    tpackets: 600_000,
                    ..NetworkInfo::default()
                }],
                vbds: vec![
                    VbdInfo {
                        kind: VbdKind::BlkBack,
                        dev: 0xca00,
                        rd_reqs: 88_000,
                        wr_reqs: 41_000,
                        rd_sects: 704_000,
                        wr_sects: 328_000,
                        ..VbdInfo::default()
                    },
                    VbdInfo {
                        kind: VbdKind::BlkTap,
                        dev: 0xca10,
                        oo_reqs: 3,
                        rd_reqs: 5_000,
                        rd_sects: 40_000,
                        ..VbdInfo::default()
                    },
                ],
                ..Domain::default()
            },
            Domain {
                id: 12,
                name: "batch-worker".to_string(),
                flags: DomainFlags {
                    paused: true,
                    ..DomainFlags::default()
                },
                cpu_ns: 77 * NS_PER_SEC,
                cur_mem: 2 * GIB,
                max_mem: 4 * GIB,
                vcpus: online_vcpus(2, 38 * NS_PER_SEC),
                ..Domain::default()
            },
        ];

        let loads = vec![
            Load {
                cpu_ns: 120_000_000,
                ..Load::default()
            },
            Load {
                cpu_ns: 2_600_000_000,
                rx_bytes: 3 * MIB,
                tx_bytes: 9 * MIB,
                rd_reqs: 40,
                wr_reqs: 180,
            },
            Load {
                cpu_ns: 35_000_000,
                rx_bytes: 64 * 1024,
                tx_bytes: 16 * 1024,
                rd_reqs: 6,
                wr_reqs: 2,
            },
            Load::default(),
        ];

        Self::new(Snapshot { node, domains }, loads)
    }
}

impl MockBackend {
    /// Simulated node from [`Simulation::typical_node`].
    pub fn typical_node() -> Self {
        Self::simulated(Simulation::typical_node())
    }
}

fn online_vcpus(count: usize, ns_each: u64) -> Vec<VcpuInfo> {
    vec![
        VcpuInfo {
            online: true,
            ns: ns_each,
        };
        count
    ]
}

fn apply_load(domain: &mut Domain, load: &Load) {
    domain.cpu_ns = domain.cpu_ns.saturating_add(load.cpu_ns);

    let online = domain.vcpus.iter().filter(|v| v.online).count() as u64;
    if online > 0 {
        let share = load.cpu_ns / online;
        for vcpu in domain.vcpus.iter_mut().filter(|v| v.online) {
            vcpu.ns = vcpu.ns.saturating_add(share);
        }
    }

    if let Some(net) = domain.networks.first_mut() {
        net.rbytes = net.rbytes.saturating_add(load.rx_bytes);
        net.tbytes = net.tbytes.saturating_add(load.tx_bytes);
        net.rpackets = net.rpackets.saturating_add(load.rx_bytes / 1500);
        net.tpackets = net.tpackets.saturating_add(load.tx_bytes / 1500);
    }

    if let Some(vbd) = domain.vbds.first_mut() {
        vbd.rd_reqs = vbd.rd_reqs.saturating_add(load.rd_reqs);
        vbd.wr_reqs = vbd.wr_reqs.saturating_add(load.wr_reqs);
        vbd.rd_sects = vbd
            .rd_sects
            .saturating_add(load.rd_reqs * SECTORS_PER_REQUEST);
        vbd.wr_sects = vbd
            .wr_sects
            .saturating_add(load.wr_reqs * SECTORS_PER_REQUEST);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::StatsBackend;
    use crate::model::{NetDirection, VbdCounter};

    #[test]
    fn test_typical_node_layout() {
        let mut backend = MockBackend::typical_node();
        let snapshot = backend.fetch_snapshot().unwrap();
        assert_eq!(snapshot.num_domains(), 4);
        assert_eq!(snapshot.node.num_cpus, 8);
        assert!(!snapshot.domain(0).unwrap().has_memory_limit());
        assert_eq!(snapshot.domain(7).unwrap().vbds.len(), 2);
    }

    #[test]
    fn test_counters_advance() {
        let mut backend = MockBackend::typical_node();
        let first = backend.fetch_snapshot().unwrap();
        let second = backend.fetch_snapshot().unwrap();

        let web_before = first.domain(3).unwrap();
        let web_after = second.domain(3).unwrap();
        assert_eq!(web_after.cpu_ns - web_before.cpu_ns, 2_600_000_000);
        assert_eq!(
            web_after.total_net_bytes(NetDirection::Tx) - web_before.total_net_bytes(NetDirection::Tx),
            9 * MIB
        );
        assert_eq!(
            web_after.total_vbd(VbdCounter::WriteSectors)
                - web_before.total_vbd(VbdCounter::WriteSectors),
            180 * SECTORS_PER_REQUEST
        );
        assert_eq!(web_after.vcpus[0].ns - web_before.vcpus[0].ns, 650_000_000);
    }

    #[test]
    fn test_paused_domain_does_not_advance() {
        let mut simulation = Simulation::typical_node();
        let first = simulation.next_snapshot();
        let second = simulation.next_snapshot();
        assert_eq!(
            first.domain(12).unwrap().cpu_ns,
            second.domain(12).unwrap().cpu_ns
        );
    }

    #[test]
    fn test_offline_vcpu_does_not_advance() {
        let mut simulation = Simulation::typical_node();
        simulation.next_snapshot();
        let second = simulation.next_snapshot();
        let db = second.domain(7).unwrap();
        assert_eq!(db.vcpus[0].ns, 410 * NS_PER_SEC + 35_000_000);
        assert_eq!(db.vcpus[1].ns, 0);
    }
}
