//! Output strategies and the shared per-tick traversal.
//!
//! A [`Renderer`] only knows how to print each piece of a tick; the order in
//! which pieces appear is decided once by [`render_tick`]. Renderers are
//! built fresh for every tick and hold no state across ticks.

mod delimited;
mod structured;
mod summary;
mod text;

pub use delimited::DelimitedRenderer;
pub use structured::StructuredRenderer;
pub use summary::NodeSummary;
pub use text::TextRenderer;

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, RenderError};
use crate::fields::{FieldContext, FieldId, IdentMode};
use crate::model::{Domain, Sample};
use crate::table::SortState;

/// Suffix appended to the header of the sort column.
pub const SORT_MARKER: &str = "(s)";

/// Header text of a column, with the sort marker when it is the sort column.
pub fn header_label(field: FieldId, sort_field: FieldId) -> String {
    if field == sort_field {
        format!("{}{}", field.header(), SORT_MARKER)
    } else {
        field.header().to_string()
    }
}

/// Per-strategy hooks called by [`render_tick`].
pub trait Renderer {
    fn summary(&mut self, summary: &NodeSummary);

    /// Column headers. Called before the first displayed domain, and before
    /// every domain when headers repeat.
    fn header(&mut self, sort_field: FieldId);

    fn domain_row(&mut self, cx: &FieldContext<'_>, domain: &Domain);

    fn vcpu_section(&mut self, domain: &Domain);

    fn network_section(&mut self, domain: &Domain);

    fn block_device_section(&mut self, domain: &Domain);

    fn tmem_section(&mut self, domain: &Domain);

    /// Between two consecutive domains, never after the last one.
    fn domain_separator(&mut self) {}

    /// Completes the tick and returns its output.
    fn finish(&mut self) -> Result<String, RenderError>;
}

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// Aligned text table.
    #[default]
    Text,
    /// Comma separated records.
    Delimited,
    /// One JSON document per tick.
    Structured,
}

impl OutputKind {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputKind::Text => Box::new(TextRenderer::new()),
            OutputKind::Delimited => Box::new(DelimitedRenderer::new()),
            OutputKind::Structured => Box::new(StructuredRenderer::new()),
        }
    }
}

impl FromStr for OutputKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "org" | "text" => Ok(OutputKind::Text),
            "csv" | "delimited" => Ok(OutputKind::Delimited),
            "json" | "structured" => Ok(OutputKind::Structured),
            _ => Err(ConfigError::UnknownOutput(s.to_string())),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Text => write!(f, "org"),
            OutputKind::Delimited => write!(f, "csv"),
            OutputKind::Structured => write!(f, "json"),
        }
    }
}

/// Optional per-domain sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub vcpus: bool,
    pub networks: bool,
    pub vbds: bool,
    pub tmem: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            vcpus: true,
            networks: true,
            vbds: true,
            tmem: true,
        }
    }
}

/// Everything that shapes a tick's output apart from the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySettings {
    pub sort: SortState,
    pub repeat_header: bool,
    pub sections: Sections,
}

/// Renders one tick: summary, then every visible domain in sort order with
/// its enabled sections.
pub fn render_tick(
    renderer: &mut dyn Renderer,
    current: &Sample,
    previous: Option<&Sample>,
    ident: IdentMode,
    settings: &DisplaySettings,
) -> Result<String, RenderError> {
    let cx = FieldContext::new(current, previous, ident);

    renderer.summary(&NodeSummary::from_sample(current));

    let domains = settings.sort.apply(&cx);
    let sections = settings.sections;

    for (i, domain) in domains.iter().enumerate() {
        if i == 0 || settings.repeat_header {
            renderer.header(settings.sort.field);
        }

        renderer.domain_row(&cx, domain);

        if sections.vcpus {
            renderer.vcpu_section(domain);
        }
        if sections.networks {
            renderer.network_section(domain);
        }
        if sections.vbds {
            renderer.block_device_section(domain);
        }
        if sections.tmem {
            renderer.tmem_section(domain);
        }

        if i + 1 < domains.len() {
            renderer.domain_separator();
        }
    }

    renderer.finish()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use crate::model::{
        Domain, DomainFlags, NetworkInfo, NodeInfo, Sample, Snapshot, TmemInfo,
        UNLIMITED_MEMORY, VbdInfo, VbdKind, VcpuInfo,
    };
    use crate::rates::NS_PER_SEC;

    pub fn node() -> NodeInfo {
        NodeInfo {
            tot_mem: 8 * 1024 * 1024 * 1024,
            free_mem: 2 * 1024 * 1024 * 1024,
            freeable_mb: 0,
            num_cpus: 4,
            cpu_hz: 2_400_000_000,
        }
    }

    /// Two domains: "Domain-0" at 5 s of CPU time, "Domain-1" at 1 s.
    pub fn two_domains() -> Snapshot {
        Snapshot {
            node: node(),
            domains: vec![
                Domain {
                    id: 0,
                    name: "Domain-0".to_string(),
                    flags: DomainFlags::running(),
                    cpu_ns: 5 * NS_PER_SEC,
                    cur_mem: 1024 * 1024 * 1024,
                    max_mem: UNLIMITED_MEMORY,
                    vcpus: vec![
                        VcpuInfo {
                            online: true,
                            ns: 3 * NS_PER_SEC,
                        },
                        VcpuInfo {
                            online: false,
                            ns: 0,
                        },
                    ],
                    networks: vec![NetworkInfo {
                        rbytes: 2048,
                        rpackets: 12,
                        tbytes: 1024,
                        tpackets: 7,
                        ..NetworkInfo::default()
                    }],
                    vbds: vec![VbdInfo {
                        kind: VbdKind::BlkBack,
                        dev: 0xca10,
                        rd_reqs: 40,
                        wr_reqs: 8,
                        rd_sects: 320,
                        wr_sects: 64,
                        ..VbdInfo::default()
                    }],
                    tmem: Some(TmemInfo {
                        curr_eph_pages: 3,
                        ..TmemInfo::default()
                    }),
                    ..Domain::default()
                },
                Domain {
                    id: 1,
                    name: "Domain-1".to_string(),
                    flags: DomainFlags::blocked(),
                    cpu_ns: NS_PER_SEC,
                    cur_mem: 768 * 1024 * 1024,
                    max_mem: 1024 * 1024 * 1024,
                    ssid: 2,
                    vcpus: vec![VcpuInfo {
                        online: true,
                        ns: NS_PER_SEC,
                    }],
                    ..Domain::default()
                },
            ],
        }
    }

    pub fn sample(snapshot: Snapshot) -> Sample {
        Sample::new(snapshot, Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap())
    }
}
