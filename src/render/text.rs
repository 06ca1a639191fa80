//! Aligned text table, the default output.

use crate::error::RenderError;
use crate::fields::{FIELDS, Field, FieldContext, FieldId};
use crate::fmt::pad;
use crate::model::Domain;
use crate::rates::NS_PER_SEC;

use super::{NodeSummary, Renderer, SORT_MARKER, header_label};

const DOMAIN_SEPARATOR: &str = "--";
const CLOSING_LINE: &str = "----------------";
const VBD_HEADER: &str =
    "vbdType device details       OO RD(total) WR(total) RD(sector) WR(sector)";

/// Column width: the declared width, widened to fit the header and, on the
/// sort column, its marker.
fn column_width(field: &Field, sort_field: FieldId) -> usize {
    let marker = if field.id == sort_field {
        SORT_MARKER.len()
    } else {
        0
    };
    field.width.max(field.header.len() + marker)
}

pub struct TextRenderer {
    out: String,
    sort_field: FieldId,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            sort_field: FieldId::default(),
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TextRenderer {
    fn summary(&mut self, s: &NodeSummary) {
        let mem = match s.mem_freeable_k {
            Some(freeable) => format!(
                "Mem: {}k total, {}k used, {}k free, {}k freeable, ",
                s.mem_total_k, s.mem_used_k, s.mem_free_k, freeable
            ),
            None => format!(
                "Mem: {}k total, {}k used, {}k free    ",
                s.mem_total_k, s.mem_used_k, s.mem_free_k
            ),
        };
        self.out.push_str(&format!(
            "Date: {}, Domains: {}, {} running, {} blocked, {} paused, {} crashed, {} dying, {} shutdown {}CPUs: {} @ {}MHz\n",
            s.date,
            s.domains,
            s.running,
            s.blocked,
            s.paused,
            s.crashed,
            s.dying,
            s.shutdown,
            mem,
            s.num_cpus,
            s.cpu_mhz
        ));
    }

    fn header(&mut self, sort_field: FieldId) {
        self.sort_field = sort_field;
        let line: Vec<String> = FIELDS
            .iter()
            .map(|f| {
                pad(
                    &header_label(f.id, sort_field),
                    column_width(f, sort_field),
                    f.align,
                )
            })
            .collect();
        self.out.push_str(&line.join(" "));
        self.out.push('\n');
    }

    fn domain_row(&mut self, cx: &FieldContext<'_>, domain: &Domain) {
        let line: Vec<String> = FIELDS
            .iter()
            .map(|f| {
                pad(
                    &f.id.format_fixed(cx, domain),
                    column_width(f, self.sort_field),
                    f.align,
                )
            })
            .collect();
        self.out.push_str(&line.join(" "));
        self.out.push('\n');
    }

    fn vcpu_section(&mut self, domain: &Domain) {
        let vcpus: Vec<String> = domain
            .vcpus
            .iter()
            .enumerate()
            .map(|(i, vcpu)| {
                if vcpu.online {
                    format!("{:2} {:10}", i, vcpu.ns / NS_PER_SEC)
                } else {
                    format!("{:2} offline", i)
                }
            })
            .collect();
        self.out
            .push_str(&format!("VCPU# VCPUs(s): {}\n", vcpus.join(",")));
    }

    fn network_section(&mut self, domain: &Domain) {
        if domain.networks.is_empty() {
            return;
        }
        self.out.push_str(&format!(
            "IF# RX[ {:>12} {:>10} {:>8} {:>8} ] TX[ {:>12} {:>10} {:>8} {:>8} ]\n",
            "bytes", "pkts", "err", "drop", "bytes", "pkts", "err", "drop"
        ));
        for (i, net) in domain.networks.iter().enumerate() {
            self.out.push_str(&format!(
                "{:2}      {:12} {:10} {:8} {:8}       {:12} {:10} {:8} {:8}\n",
                i,
                net.rbytes,
                net.rpackets,
                net.rerrs,
                net.rdrop,
                net.tbytes,
                net.tpackets,
                net.terrs,
                net.tdrop
            ));
        }
    }

    fn block_device_section(&mut self, domain: &Domain) {
        if domain.vbds.is_empty() {
            return;
        }
        self.out.push_str(VBD_HEADER);
        self.out.push('\n');
        for vbd in &domain.vbds {
            let details = format!("[{:2x}:{:2x}] ", vbd.major(), vbd.minor());
            self.out.push_str(&format!(
                "{:<7} {:6} {:>7} {:8} {:9} {:9} {:10} {:10}\n",
                vbd.kind.label(),
                vbd.dev,
                details,
                vbd.oo_reqs,
                vbd.rd_reqs,
                vbd.wr_reqs,
                vbd.rd_sects,
                vbd.wr_sects
            ));
        }
    }

    fn tmem_section(&mut self, domain: &Domain) {
        let Some(tmem) = domain.tmem.as_ref().filter(|t| !t.is_zero()) else {
            return;
        };
        self.out.push_str(&format!(
            "Tmem:  Curr eph pages: {:8}   Succ eph gets: {:8}   Succ pers puts: {:8}   Succ pers gets: {:8}\n",
            tmem.curr_eph_pages, tmem.succ_eph_gets, tmem.succ_pers_puts, tmem.succ_pers_gets
        ));
    }

    fn domain_separator(&mut self) {
        self.out.push_str(DOMAIN_SEPARATOR);
        self.out.push('\n');
    }

    fn finish(&mut self) -> Result<String, RenderError> {
        self.out.push_str(CLOSING_LINE);
        self.out.push('\n');
        Ok(std::mem::take(&mut self.out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::IdentMode;
    use crate::render::test_support::{sample, two_domains};
    use crate::render::{DisplaySettings, Sections, render_tick};
    use crate::table::SortState;

    fn render(settings: &DisplaySettings) -> String {
        let current = sample(two_domains());
        let mut renderer = TextRenderer::new();
        render_tick(&mut renderer, &current, None, IdentMode::Name, settings).unwrap()
    }

    fn no_sections() -> DisplaySettings {
        DisplaySettings {
            sections: Sections {
                vcpus: false,
                networks: false,
                vbds: false,
                tmem: false,
            },
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn test_table_without_previous_sample() {
        let out = render(&no_sections());
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Date: "));
        assert!(lines[0].contains("Domains: 2, 1 running, 1 blocked, 0 paused"));
        assert!(lines[0].ends_with("CPUs: 4 @ 2400MHz"));

        let header: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(header[0], "NAME(s)");
        assert_eq!(header.len(), FIELDS.len());

        let dom0: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(dom0[0], "Domain-0");
        assert_eq!(dom0[FieldId::Cpu.index()], "5");
        assert_eq!(dom0[FieldId::CpuPct.index()], "0.0");

        assert_eq!(lines[3], "--");

        let dom1: Vec<&str> = lines[4].split_whitespace().collect();
        assert_eq!(dom1[0], "Domain-1");
        assert_eq!(dom1[FieldId::Cpu.index()], "1");
        assert_eq!(dom1[FieldId::CpuPct.index()], "0.0");

        assert_eq!(lines[5], "----------------");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_columns_align_with_header() {
        let settings = DisplaySettings {
            sort: SortState::new(FieldId::MaxMemPct),
            ..no_sections()
        };
        let out = render(&settings);
        let lines: Vec<&str> = out.lines().collect();
        // Domain-0 is unbounded and sorts first.
        assert_eq!(lines[1].len(), lines[2].len());
        assert_eq!(lines[1].len(), lines[4].len());
        assert!(lines[1].contains("MAXMEM(%)(s)"));
        let end = lines[1].find("MAXMEM(%)(s)").unwrap() + "MAXMEM(%)(s)".len();
        assert_eq!(&lines[2][end - 3..end], "n/a");
        assert_eq!(&lines[4][end - 4..end], "12.5");
    }

    #[test]
    fn test_sections() {
        let out = render(&DisplaySettings::default());
        assert!(out.contains("VCPU# VCPUs(s):  0          3, 1 offline\n"));
        assert!(out.contains("VCPU# VCPUs(s):  0          1\n"));
        assert!(out.contains("IF# RX[        bytes       pkts      err     drop ]"));
        assert!(out.contains(" 0              2048         12        0        0"));
        assert!(out.contains("vbdType device details"));
        assert!(out.contains("BlkBack  51728 [ca:10]         0        40         8        320         64"));
        assert!(out.contains("Tmem:  Curr eph pages:        3"));
        // Domain-1 has no interfaces, devices or tmem activity.
        assert_eq!(out.matches("IF# RX[").count(), 1);
        assert_eq!(out.matches("Tmem:").count(), 1);
    }

    #[test]
    fn test_full_name_is_not_truncated() {
        let mut snapshot = two_domains();
        snapshot.domains[0].name = "very-long-domain-name".to_string();
        let current = sample(snapshot);

        let mut renderer = TextRenderer::new();
        let short = render_tick(&mut renderer, &current, None, IdentMode::Name, &no_sections())
            .unwrap();
        assert!(short.contains("very-long- "));
        assert!(!short.contains("very-long-domain-name"));

        let mut renderer = TextRenderer::new();
        let full = render_tick(
            &mut renderer,
            &current,
            None,
            IdentMode::FullName,
            &no_sections(),
        )
        .unwrap();
        assert!(full.contains("very-long-domain-name"));
    }

    #[test]
    fn test_freeable_memory_in_summary() {
        let mut snapshot = two_domains();
        snapshot.node.freeable_mb = 2;
        let current = sample(snapshot);
        let mut renderer = TextRenderer::new();
        let out =
            render_tick(&mut renderer, &current, None, IdentMode::Name, &no_sections()).unwrap();
        assert!(out.contains("k free, 2048k freeable, CPUs: 4 @ 2400MHz"));
    }
}
