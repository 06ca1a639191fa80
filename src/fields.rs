//! Field registry: the closed set of per-domain statistics columns.
//!
//! Every column is described once in [`FIELDS`] and dispatched through
//! [`FieldId`] with exhaustive matches. The same descriptor drives sorting
//! ([`FieldId::compare`]), the aligned text table ([`FieldId::format_fixed`])
//! and the delimited/structured output ([`FieldId::format_value`]).
//!
//! Registry order is the column order of every output format.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::fmt::{Align, format_pct, kib, pad, truncate};
use crate::model::{
    Domain, DomainState, NetDirection, NodeInfo, Sample, Snapshot, VbdCounter,
};
use crate::rates::{self, NS_PER_SEC};

/// How the NAME column identifies a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentMode {
    /// Name truncated to the column width.
    #[default]
    Name,
    /// Untruncated name.
    FullName,
    /// Numeric domain id.
    Id,
}

impl FromStr for IdentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(IdentMode::Name),
            "full" => Ok(IdentMode::FullName),
            "id" => Ok(IdentMode::Id),
            _ => Err(ConfigError::UnknownIdentifier(s.to_string())),
        }
    }
}

/// Everything a field needs to evaluate one domain during a render pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub current: &'a Snapshot,
    pub previous: Option<&'a Snapshot>,
    /// Microseconds between the previous and the current tick start.
    pub elapsed_us: f64,
    pub ident: IdentMode,
}

impl<'a> FieldContext<'a> {
    /// Builds a context from the current sample and, if any, the previous one.
    pub fn new(current: &'a Sample, previous: Option<&'a Sample>, ident: IdentMode) -> Self {
        let elapsed_us = previous
            .map(|p| rates::elapsed_micros(current.taken_at, p.taken_at))
            .unwrap_or(0.0);
        Self {
            current: &current.snapshot,
            previous: previous.map(|p| &p.snapshot),
            elapsed_us,
            ident,
        }
    }

    pub fn node(&self) -> &'a NodeInfo {
        &self.current.node
    }

    pub fn cpu_percent(&self, domain: &Domain) -> f64 {
        rates::cpu_percent(domain, self.previous, self.elapsed_us)
    }
}

/// Identifier of a statistics column. Discriminants are registry indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldId {
    #[default]
    Name,
    State,
    Cpu,
    CpuPct,
    Mem,
    MemPct,
    MaxMem,
    MaxMemPct,
    Vcpus,
    Nets,
    NetRx,
    NetTx,
    Vbds,
    VbdOo,
    VbdRd,
    VbdWr,
    VbdRsect,
    VbdWsect,
    Ssid,
}

/// Static description of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    /// Option name used by `--sort`.
    pub key: &'static str,
    pub header: &'static str,
    /// Declared display width in the text table.
    pub width: usize,
    pub align: Align,
}

const fn field(
    id: FieldId,
    key: &'static str,
    header: &'static str,
    width: usize,
    align: Align,
) -> Field {
    Field {
        id,
        key,
        header,
        width,
        align,
    }
}

/// The registry, in display order.
pub const FIELDS: [Field; 19] = [
    field(FieldId::Name, "name", "NAME", 10, Align::Left),
    field(FieldId::State, "state", "STATE", 6, Align::Left),
    field(FieldId::Cpu, "cpu", "CPU(sec)", 10, Align::Right),
    field(FieldId::CpuPct, "cpu_pct", "CPU(%)", 6, Align::Right),
    field(FieldId::Mem, "mem", "MEM(k)", 10, Align::Right),
    field(FieldId::MemPct, "mem_pct", "MEM(%)", 6, Align::Right),
    field(FieldId::MaxMem, "maxmem", "MAXMEM(k)", 10, Align::Right),
    field(FieldId::MaxMemPct, "max_pct", "MAXMEM(%)", 9, Align::Right),
    field(FieldId::Vcpus, "vcpus", "VCPUS", 5, Align::Right),
    field(FieldId::Nets, "nets", "NETS", 4, Align::Right),
    field(FieldId::NetRx, "net_rx", "NETRX(k)", 8, Align::Right),
    field(FieldId::NetTx, "net_tx", "NETTX(k)", 8, Align::Right),
    field(FieldId::Vbds, "vbds", "VBDS", 4, Align::Right),
    field(FieldId::VbdOo, "vbd_oo", "VBD_OO", 8, Align::Right),
    field(FieldId::VbdRd, "vbd_rd", "VBD_RD", 8, Align::Right),
    field(FieldId::VbdWr, "vbd_wr", "VBD_WR", 8, Align::Right),
    field(FieldId::VbdRsect, "vbd_rsect", "VBD_RSECT", 10, Align::Right),
    field(FieldId::VbdWsect, "vbd_wsect", "VBD_WSECT", 10, Align::Right),
    field(FieldId::Ssid, "ssid", "SSID", 4, Align::Right),
];

/// Sort order of a numeric key: larger values first.
pub(crate) fn descending<T: PartialOrd>(a: T, b: T) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Case-insensitive name comparison (ASCII case folding).
fn compare_names(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|c| c.to_ascii_lowercase());
    let b = b.bytes().map(|c| c.to_ascii_lowercase());
    a.cmp(b)
}

/// The first priority flag set on exactly one side decides; that side sorts
/// first. Domains without flags therefore sort after any flagged domain.
fn compare_states(a: &Domain, b: &Domain) -> Ordering {
    for state in DomainState::PRIORITY {
        match (a.flags.has(state), b.flags.has(state)) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

impl FieldId {
    /// All fields in registry order.
    pub fn all() -> impl Iterator<Item = FieldId> {
        FIELDS.iter().map(|f| f.id)
    }

    /// Registry position of this field.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static Field {
        &FIELDS[self.index()]
    }

    pub fn header(self) -> &'static str {
        self.descriptor().header
    }

    /// Compares two domains by this field. `Less` means `a` is listed first.
    pub fn compare(self, cx: &FieldContext<'_>, a: &Domain, b: &Domain) -> Ordering {
        match self {
            FieldId::Name => compare_names(&a.name, &b.name),
            FieldId::State => compare_states(a, b),
            FieldId::Cpu => descending(a.cpu_ns, b.cpu_ns),
            FieldId::CpuPct => descending(cx.cpu_percent(a), cx.cpu_percent(b)),
            FieldId::Mem | FieldId::MemPct => descending(a.cur_mem, b.cur_mem),
            FieldId::MaxMem | FieldId::MaxMemPct => descending(a.max_mem, b.max_mem),
            FieldId::Vcpus => descending(a.num_vcpus(), b.num_vcpus()),
            FieldId::Nets => descending(a.networks.len(), b.networks.len()),
            FieldId::NetRx => descending(
                a.total_net_bytes(NetDirection::Rx),
                b.total_net_bytes(NetDirection::Rx),
            ),
            FieldId::NetTx => descending(
                a.total_net_bytes(NetDirection::Tx),
                b.total_net_bytes(NetDirection::Tx),
            ),
            FieldId::Vbds => descending(a.vbds.len(), b.vbds.len()),
            FieldId::VbdOo | FieldId::VbdRd | FieldId::VbdWr | FieldId::VbdRsect
            | FieldId::VbdWsect => {
                let counter = self.vbd_counter().unwrap_or(VbdCounter::OutOfRequests);
                descending(a.total_vbd(counter), b.total_vbd(counter))
            }
            FieldId::Ssid => a.ssid.cmp(&b.ssid),
        }
    }

    /// Unpadded scalar value, as used by delimited and structured output.
    pub fn format_value(self, cx: &FieldContext<'_>, domain: &Domain) -> String {
        match self {
            FieldId::Name => match cx.ident {
                IdentMode::Name | IdentMode::FullName => domain.name.clone(),
                IdentMode::Id => domain.id.to_string(),
            },
            FieldId::State => domain.flags.letter().to_string(),
            FieldId::Cpu => (domain.cpu_ns / NS_PER_SEC).to_string(),
            FieldId::CpuPct => format_pct(cx.cpu_percent(domain)),
            FieldId::Mem => kib(domain.cur_mem).to_string(),
            FieldId::MemPct => format_pct(rates::mem_percent(domain.cur_mem, cx.node())),
            FieldId::MaxMem => {
                if domain.has_memory_limit() {
                    kib(domain.max_mem).to_string()
                } else {
                    "no limit".to_string()
                }
            }
            FieldId::MaxMemPct => match rates::max_mem_percent(domain, cx.node()) {
                Some(pct) => format_pct(pct),
                None => "n/a".to_string(),
            },
            FieldId::Vcpus => domain.num_vcpus().to_string(),
            FieldId::Nets => domain.networks.len().to_string(),
            FieldId::NetRx => kib(domain.total_net_bytes(NetDirection::Rx)).to_string(),
            FieldId::NetTx => kib(domain.total_net_bytes(NetDirection::Tx)).to_string(),
            FieldId::Vbds => domain.vbds.len().to_string(),
            FieldId::VbdOo | FieldId::VbdRd | FieldId::VbdWr | FieldId::VbdRsect
            | FieldId::VbdWsect => {
                let counter = self.vbd_counter().unwrap_or(VbdCounter::OutOfRequests);
                domain.total_vbd(counter).to_string()
            }
            FieldId::Ssid => domain.ssid.to_string(),
        }
    }

    /// Value padded to the declared column width.
    ///
    /// Only the short-name identifier is truncated; every other value that
    /// does not fit overflows the column.
    pub fn format_fixed(self, cx: &FieldContext<'_>, domain: &Domain) -> String {
        let f = self.descriptor();
        let value = self.format_value(cx, domain);
        let value = match (self, cx.ident) {
            (FieldId::Name, IdentMode::Name) => truncate(&value, f.width),
            _ => value,
        };
        pad(&value, f.width, f.align)
    }

    fn vbd_counter(self) -> Option<VbdCounter> {
        match self {
            FieldId::VbdOo => Some(VbdCounter::OutOfRequests),
            FieldId::VbdRd => Some(VbdCounter::ReadRequests),
            FieldId::VbdWr => Some(VbdCounter::WriteRequests),
            FieldId::VbdRsect => Some(VbdCounter::ReadSectors),
            FieldId::VbdWsect => Some(VbdCounter::WriteSectors),
            _ => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().key)
    }
}

impl FromStr for FieldId {
    type Err = ConfigError;

    /// Accepts the option key (`cpu_pct`) or the column header (`CPU(%)`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FIELDS
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(wanted) || f.header.eq_ignore_ascii_case(wanted))
            .map(|f| f.id)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DomainFlags, NetworkInfo, UNLIMITED_MEMORY, VbdInfo, VcpuInfo};

    fn node() -> NodeInfo {
        NodeInfo {
            tot_mem: 8 * 1024 * 1024 * 1024,
            free_mem: 4 * 1024 * 1024 * 1024,
            num_cpus: 4,
            cpu_hz: 2_400_000_000,
            ..NodeInfo::default()
        }
    }

    fn ctx(snapshot: &Snapshot) -> FieldContext<'_> {
        FieldContext {
            current: snapshot,
            previous: None,
            elapsed_us: 0.0,
            ident: IdentMode::Name,
        }
    }

    fn sample_domain() -> Domain {
        Domain {
            id: 4,
            name: "webserver-production".to_string(),
            flags: DomainFlags::running(),
            cpu_ns: 12 * NS_PER_SEC + 400_000_000,
            cur_mem: 1024 * 1024 * 1024,
            max_mem: UNLIMITED_MEMORY,
            ssid: 7,
            vcpus: vec![VcpuInfo::default(); 2],
            networks: vec![NetworkInfo {
                rbytes: 4096,
                tbytes: 2048,
                ..NetworkInfo::default()
            }],
            vbds: vec![VbdInfo {
                rd_reqs: 11,
                wr_sects: 9,
                ..VbdInfo::default()
            }],
            ..Domain::default()
        }
    }

    #[test]
    fn test_registry_indices_match_ids() {
        for (i, f) in FIELDS.iter().enumerate() {
            assert_eq!(f.id.index(), i, "field {} out of place", f.header);
            assert!(f.width >= 4);
        }
        assert_eq!(FieldId::all().count(), FIELDS.len());
    }

    #[test]
    fn test_format_values() {
        let snap = Snapshot {
            node: node(),
            domains: vec![sample_domain()],
        };
        let cx = ctx(&snap);
        let d = &snap.domains[0];

        let values: Vec<String> = FieldId::all().map(|f| f.format_value(&cx, d)).collect();
        assert_eq!(
            values,
            vec![
                "webserver-production",
                "r",
                "12",
                "0.0",
                "1048576",
                "12.5",
                "no limit",
                "n/a",
                "2",
                "1",
                "4",
                "2",
                "1",
                "0",
                "11",
                "0",
                "0",
                "9",
                "7",
            ]
        );
    }

    #[test]
    fn test_summed_counters_do_not_overflow() {
        let mut d = sample_domain();
        d.networks = vec![
            NetworkInfo {
                rbytes: u64::MAX - 10,
                ..NetworkInfo::default()
            },
            NetworkInfo {
                rbytes: 100,
                ..NetworkInfo::default()
            },
        ];
        let snap = Snapshot {
            node: node(),
            domains: vec![d.clone()],
        };
        let cx = ctx(&snap);

        assert_eq!(
            FieldId::NetRx.format_value(&cx, &d),
            (u64::MAX / 1024).to_string()
        );
        assert_eq!(FieldId::NetRx.compare(&cx, &d, &d), Ordering::Equal);
    }

    #[test]
    fn test_format_fixed_width() {
        let snap = Snapshot {
            node: node(),
            domains: vec![sample_domain()],
        };
        let d = &snap.domains[0];
        let mut cx = ctx(&snap);

        assert_eq!(FieldId::Name.format_fixed(&cx, d), "webserver-");
        assert_eq!(FieldId::Cpu.format_fixed(&cx, d), "        12");
        assert_eq!(FieldId::MaxMem.format_fixed(&cx, d), "  no limit");
        assert_eq!(FieldId::MaxMemPct.format_fixed(&cx, d), "      n/a");
        assert_eq!(FieldId::State.format_fixed(&cx, d), "r     ");

        cx.ident = IdentMode::FullName;
        assert_eq!(FieldId::Name.format_fixed(&cx, d), "webserver-production");

        cx.ident = IdentMode::Id;
        assert_eq!(FieldId::Name.format_fixed(&cx, d), "4         ");
        assert_eq!(FieldId::Name.format_value(&cx, d), "4");
    }

    #[test]
    fn test_compare_name_case_insensitive() {
        let snap = Snapshot::default();
        let cx = ctx(&snap);
        let zeta = Domain {
            name: "Zeta".to_string(),
            ..Domain::default()
        };
        let alpha = Domain {
            name: "alpha".to_string(),
            ..Domain::default()
        };
        assert_eq!(FieldId::Name.compare(&cx, &alpha, &zeta), Ordering::Less);
        assert_eq!(FieldId::Name.compare(&cx, &zeta, &alpha), Ordering::Greater);
    }

    #[test]
    fn test_compare_numeric_descending_ssid_ascending() {
        let snap = Snapshot::default();
        let cx = ctx(&snap);
        let big = Domain {
            cpu_ns: 10,
            ssid: 9,
            ..Domain::default()
        };
        let small = Domain {
            cpu_ns: 1,
            ssid: 1,
            ..Domain::default()
        };
        assert_eq!(FieldId::Cpu.compare(&cx, &big, &small), Ordering::Less);
        assert_eq!(FieldId::Ssid.compare(&cx, &big, &small), Ordering::Greater);
    }

    #[test]
    fn test_compare_state_priority() {
        let snap = Snapshot::default();
        let cx = ctx(&snap);
        let with = |flags: DomainFlags| Domain {
            flags,
            ..Domain::default()
        };
        let dying = with(DomainFlags {
            dying: true,
            ..DomainFlags::default()
        });
        let running = with(DomainFlags::running());
        let blocked = with(DomainFlags::blocked());
        let idle = with(DomainFlags::default());

        assert_eq!(FieldId::State.compare(&cx, &dying, &running), Ordering::Less);
        assert_eq!(FieldId::State.compare(&cx, &blocked, &running), Ordering::Less);
        assert_eq!(FieldId::State.compare(&cx, &running, &idle), Ordering::Less);
        assert_eq!(FieldId::State.compare(&cx, &idle, &blocked), Ordering::Greater);
        assert_eq!(FieldId::State.compare(&cx, &idle, &idle), Ordering::Equal);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!("cpu_pct".parse::<FieldId>().unwrap(), FieldId::CpuPct);
        assert_eq!("CPU(%)".parse::<FieldId>().unwrap(), FieldId::CpuPct);
        assert_eq!("netrx(k)".parse::<FieldId>().unwrap(), FieldId::NetRx);
        assert_eq!(" ssid ".parse::<FieldId>().unwrap(), FieldId::Ssid);
        assert!("bogus".parse::<FieldId>().is_err());
        assert_eq!(FieldId::VbdWsect.to_string(), "vbd_wsect");
    }

    #[test]
    fn test_parse_ident_mode() {
        assert_eq!("full".parse::<IdentMode>().unwrap(), IdentMode::FullName);
        assert_eq!("ID".parse::<IdentMode>().unwrap(), IdentMode::Id);
        assert!("nickname".parse::<IdentMode>().is_err());
    }
}
