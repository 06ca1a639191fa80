//! JSON document, one per tick, on a single line.
//!
//! Layout:
//!
//! ```text
//! {"hypervisor": {...},
//!  "<domain id>": {"stat": [...], "vcpus": {...}, "vifs": [[...]],
//!                  "vblks": [[...]], "tmem": [...]}, ...}
//! ```
//!
//! All scalars are strings. Disabled sections are absent from the document.
//! An entry that cannot be serialized is dropped from the document.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::RenderError;
use crate::fields::{FIELDS, FieldContext, FieldId};
use crate::model::Domain;
use crate::rates::NS_PER_SEC;

use super::{NodeSummary, Renderer};

#[derive(Serialize, Debug, Default)]
struct MemEntry {
    total: String,
    used: String,
    free: String,
    freeable: String,
}

#[derive(Serialize, Debug, Default)]
struct CpuEntry {
    total: String,
    clock: String,
}

#[derive(Serialize, Debug, Default)]
struct HypervisorEntry {
    date: String,
    domains: String,
    running: String,
    blocked: String,
    paused: String,
    crashed: String,
    dying: String,
    shutdown: String,
    mem: MemEntry,
    cpu: CpuEntry,
}

impl From<&NodeSummary> for HypervisorEntry {
    fn from(s: &NodeSummary) -> Self {
        Self {
            date: s.date.clone(),
            domains: s.domains.to_string(),
            running: s.running.to_string(),
            blocked: s.blocked.to_string(),
            paused: s.paused.to_string(),
            crashed: s.crashed.to_string(),
            dying: s.dying.to_string(),
            shutdown: s.shutdown.to_string(),
            mem: MemEntry {
                total: format!("{}k", s.mem_total_k),
                used: format!("{}k", s.mem_used_k),
                free: format!("{}k", s.mem_free_k),
                freeable: format!("{}k", s.mem_freeable_k.unwrap_or(0)),
            },
            cpu: CpuEntry {
                total: s.num_cpus.to_string(),
                clock: format!("{}MHz", s.cpu_mhz),
            },
        }
    }
}

#[derive(Serialize, Debug, Default)]
struct DomainEntry {
    stat: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vcpus: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vifs: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vblks: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tmem: Option<Vec<String>>,
}

/// Adds `value` under `key`, or logs and skips it when it cannot be
/// serialized.
fn insert_entry<T: Serialize>(doc: &mut Map<String, Value>, key: String, value: &T) {
    match serde_json::to_value(value) {
        Ok(value) => {
            doc.insert(key, value);
        }
        Err(e) => error!(entry = %key, error = %e, "failed to serialize entry, skipping"),
    }
}

fn strings(values: &[u64]) -> Vec<String> {
    values.iter().map(u64::to_string).collect()
}

pub struct StructuredRenderer {
    hypervisor: Option<HypervisorEntry>,
    domains: Vec<(u32, DomainEntry)>,
}

impl StructuredRenderer {
    pub fn new() -> Self {
        Self {
            hypervisor: None,
            domains: Vec::new(),
        }
    }

    /// Entry of the domain whose row was rendered last.
    fn entry(&mut self, domain: &Domain) -> Option<&mut DomainEntry> {
        match self.domains.last_mut() {
            Some((id, entry)) if *id == domain.id => Some(entry),
            _ => None,
        }
    }
}

impl Default for StructuredRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for StructuredRenderer {
    fn summary(&mut self, summary: &NodeSummary) {
        self.hypervisor = Some(HypervisorEntry::from(summary));
    }

    // Column order is fixed by the registry, so headers carry no information.
    fn header(&mut self, _sort_field: FieldId) {}

    fn domain_row(&mut self, cx: &FieldContext<'_>, domain: &Domain) {
        let stat = FIELDS
            .iter()
            .map(|f| f.id.format_value(cx, domain))
            .collect();
        self.domains.push((
            domain.id,
            DomainEntry {
                stat,
                ..DomainEntry::default()
            },
        ));
    }

    fn vcpu_section(&mut self, domain: &Domain) {
        let vcpus = domain
            .vcpus
            .iter()
            .enumerate()
            .map(|(i, vcpu)| {
                let value = if vcpu.online {
                    (vcpu.ns / NS_PER_SEC).to_string()
                } else {
                    "offline".to_string()
                };
                (i.to_string(), Value::String(value))
            })
            .collect();
        if let Some(entry) = self.entry(domain) {
            entry.vcpus = Some(vcpus);
        }
    }

    fn network_section(&mut self, domain: &Domain) {
        let vifs = domain
            .networks
            .iter()
            .map(|n| {
                strings(&[
                    n.rbytes, n.rpackets, n.rerrs, n.rdrop, n.tbytes, n.tpackets, n.terrs,
                    n.tdrop,
                ])
            })
            .collect();
        if let Some(entry) = self.entry(domain) {
            entry.vifs = Some(vifs);
        }
    }

    fn block_device_section(&mut self, domain: &Domain) {
        let vblks = domain
            .vbds
            .iter()
            .map(|v| {
                let mut row = vec![
                    v.kind.label().to_string(),
                    format!("[{:2x}:{:2x}]", v.major(), v.minor()),
                ];
                row.extend(strings(&[
                    v.oo_reqs, v.rd_reqs, v.wr_reqs, v.rd_sects, v.wr_sects,
                ]));
                row
            })
            .collect();
        if let Some(entry) = self.entry(domain) {
            entry.vblks = Some(vblks);
        }
    }

    fn tmem_section(&mut self, domain: &Domain) {
        let tmem = domain.tmem.clone().unwrap_or_default();
        let values = strings(&[
            tmem.curr_eph_pages,
            tmem.succ_eph_gets,
            tmem.succ_pers_puts,
            tmem.succ_pers_gets,
        ]);
        if let Some(entry) = self.entry(domain) {
            entry.tmem = Some(values);
        }
    }

    /// Entries that fail to serialize are logged and left out; the rest of
    /// the document is still emitted.
    fn finish(&mut self) -> Result<String, RenderError> {
        let mut doc = Map::new();
        let hypervisor = self.hypervisor.take().unwrap_or_default();
        insert_entry(&mut doc, "hypervisor".to_string(), &hypervisor);
        for (id, entry) in self.domains.drain(..) {
            insert_entry(&mut doc, id.to_string(), &entry);
        }

        let mut line = serde_json::to_string(&Value::Object(doc))?;
        line.push('\n');
        Ok(line)
    }
}
