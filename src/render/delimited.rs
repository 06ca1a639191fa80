//! Comma separated output.
//!
//! The header and domain rows carry the registry columns. Everything else is
//! a tagged record whose first value names its kind (`hypervisor`, `vcpu`,
//! `vif`, `vbd`, `tmem`); section records carry the domain id second.

use crate::error::RenderError;
use crate::fields::{FIELDS, FieldContext, FieldId};
use crate::fmt::quote_delimited;
use crate::model::Domain;
use crate::rates::NS_PER_SEC;

use super::{NodeSummary, Renderer, header_label};

pub const DELIMITER: char = ',';

pub struct DelimitedRenderer {
    out: String,
}

impl DelimitedRenderer {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    fn record<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let separator = DELIMITER.to_string();
        let line: Vec<String> = values
            .into_iter()
            .map(|v| quote_delimited(v.as_ref(), DELIMITER))
            .collect();
        self.out.push_str(&line.join(separator.as_str()));
        self.out.push('\n');
    }
}

impl Default for DelimitedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for DelimitedRenderer {
    fn summary(&mut self, s: &NodeSummary) {
        self.record([
            "hypervisor".to_string(),
            s.date.clone(),
            s.domains.to_string(),
            s.running.to_string(),
            s.blocked.to_string(),
            s.paused.to_string(),
            s.crashed.to_string(),
            s.dying.to_string(),
            s.shutdown.to_string(),
            s.mem_total_k.to_string(),
            s.mem_used_k.to_string(),
            s.mem_free_k.to_string(),
            s.mem_freeable_k.unwrap_or(0).to_string(),
            s.num_cpus.to_string(),
            s.cpu_mhz.to_string(),
        ]);
    }

    fn header(&mut self, sort_field: FieldId) {
        self.record(FIELDS.iter().map(|f| header_label(f.id, sort_field)));
    }

    fn domain_row(&mut self, cx: &FieldContext<'_>, domain: &Domain) {
        self.record(FIELDS.iter().map(|f| f.id.format_value(cx, domain)));
    }

    fn vcpu_section(&mut self, domain: &Domain) {
        for (i, vcpu) in domain.vcpus.iter().enumerate() {
            let secs = if vcpu.online {
                (vcpu.ns / NS_PER_SEC).to_string()
            } else {
                "offline".to_string()
            };
            self.record([
                "vcpu".to_string(),
                domain.id.to_string(),
                i.to_string(),
                secs,
            ]);
        }
    }

    fn network_section(&mut self, domain: &Domain) {
        for (i, net) in domain.networks.iter().enumerate() {
            let mut values = vec!["vif".to_string(), domain.id.to_string(), i.to_string()];
            values.extend(
                [
                    net.rbytes,
                    net.rpackets,
                    net.rerrs,
                    net.rdrop,
                    net.tbytes,
                    net.tpackets,
                    net.terrs,
                    net.tdrop,
                ]
                .iter()
                .map(u64::to_string),
            );
            self.record(values);
        }
    }

    fn block_device_section(&mut self, domain: &Domain) {
        for vbd in &domain.vbds {
            let mut values = vec![
                "vbd".to_string(),
                domain.id.to_string(),
                vbd.kind.label().to_string(),
                vbd.dev.to_string(),
                format!("[{:x}:{:x}]", vbd.major(), vbd.minor()),
            ];
            values.extend(
                [
                    vbd.oo_reqs,
                    vbd.rd_reqs,
                    vbd.wr_reqs,
                    vbd.rd_sects,
                    vbd.wr_sects,
                ]
                .iter()
                .map(u64::to_string),
            );
            self.record(values);
        }
    }

    fn tmem_section(&mut self, domain: &Domain) {
        let Some(tmem) = domain.tmem.as_ref().filter(|t| !t.is_zero()) else {
            return;
        };
        self.record([
            "tmem".to_string(),
            domain.id.to_string(),
            tmem.curr_eph_pages.to_string(),
            tmem.succ_eph_gets.to_string(),
            tmem.succ_pers_puts.to_string(),
            tmem.succ_pers_gets.to_string(),
        ]);
    }

    fn finish(&mut self) -> Result<String, RenderError> {
        Ok(std::mem::take(&mut self.out))
    }
}
