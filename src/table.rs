//! Domain ordering and the display window.

use std::collections::HashMap;

use crate::fields::{FieldContext, FieldId, descending};
use crate::model::Domain;
use crate::rates;

/// Selected sort column and the index of the first displayed domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: FieldId,
    pub first_domain: usize,
}

impl SortState {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            first_domain: 0,
        }
    }

    /// Sorts the current snapshot's domains and applies the window offset.
    pub fn apply<'a>(&self, cx: &FieldContext<'a>) -> Vec<&'a Domain> {
        let sorted = sort_domains(cx, self.field);
        visible(sorted, self.first_domain)
    }
}

/// Returns the current snapshot's domains ordered by `field`.
///
/// The sort is stable: domains that compare equal keep backend order.
pub fn sort_domains<'a>(cx: &FieldContext<'a>, field: FieldId) -> Vec<&'a Domain> {
    if field == FieldId::CpuPct {
        return sort_by_cpu_percent(cx);
    }
    let mut domains: Vec<&'a Domain> = cx.current.domains.iter().collect();
    domains.sort_by(|a, b| field.compare(cx, a, b));
    domains
}

/// CPU% ordering with the percentage computed once per domain against an
/// id index of the previous snapshot.
fn sort_by_cpu_percent<'a>(cx: &FieldContext<'a>) -> Vec<&'a Domain> {
    let mut previous: HashMap<u32, &Domain> = HashMap::new();
    if let Some(snapshot) = cx.previous {
        // First record wins, as with `Snapshot::domain`.
        for d in &snapshot.domains {
            previous.entry(d.id).or_insert(d);
        }
    }

    let mut keyed: Vec<(f64, &'a Domain)> = cx
        .current
        .domains
        .iter()
        .map(|d| {
            let pct = rates::cpu_percent_since(d, previous.get(&d.id).copied(), cx.elapsed_us);
            (pct, d)
        })
        .collect();
    keyed.sort_by(|a, b| descending(a.0, b.0));
    keyed.into_iter().map(|(_, d)| d).collect()
}

/// Drops the first `offset` domains.
///
/// An offset past the end is clamped so the last domain stays visible.
pub fn visible<T>(mut sorted: Vec<T>, offset: usize) -> Vec<T> {
    if sorted.is_empty() {
        return sorted;
    }
    let start = offset.min(sorted.len() - 1);
    sorted.drain(..start);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::IdentMode;
    use crate::model::Snapshot;
    use crate::rates::NS_PER_SEC;

    fn domain(id: u32, name: &str, cpu_ns: u64) -> Domain {
        Domain {
            id,
            name: name.to_string(),
            cpu_ns,
            ..Domain::default()
        }
    }

    fn ctx<'a>(current: &'a Snapshot, previous: Option<&'a Snapshot>) -> FieldContext<'a> {
        FieldContext {
            current,
            previous,
            elapsed_us: 1_000_000.0,
            ident: IdentMode::Name,
        }
    }

    fn ids(domains: &[&Domain]) -> Vec<u32> {
        domains.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_sort_by_cpu_percent() {
        let base = 10 * NS_PER_SEC;
        let previous = Snapshot {
            domains: vec![domain(0, "a", base), domain(1, "b", base), domain(2, "c", base)],
            ..Snapshot::default()
        };
        let current = Snapshot {
            domains: vec![
                domain(0, "a", base),
                domain(1, "b", base + 500_000_000),
                domain(2, "c", base + 200_000_000),
            ],
            ..Snapshot::default()
        };
        let cx = ctx(&current, Some(&previous));
        let sorted = sort_domains(&cx, FieldId::CpuPct);
        assert_eq!(ids(&sorted), vec![1, 2, 0]);
    }

    #[test]
    fn test_cpu_percent_order_matches_field_compare() {
        let previous = Snapshot {
            domains: vec![
                domain(4, "d", 0),
                domain(2, "b", 3 * NS_PER_SEC),
                domain(1, "a", NS_PER_SEC),
            ],
            ..Snapshot::default()
        };
        let current = Snapshot {
            domains: vec![
                domain(1, "a", NS_PER_SEC + 100_000_000),
                domain(2, "b", 3 * NS_PER_SEC + 700_000_000),
                domain(3, "c", 9 * NS_PER_SEC),
                domain(4, "d", 100_000_000),
                domain(5, "e", 2 * NS_PER_SEC),
            ],
            ..Snapshot::default()
        };
        let cx = ctx(&current, Some(&previous));

        let sorted = sort_domains(&cx, FieldId::CpuPct);
        // Domains 3 and 5 are new (0.0) and keep backend order.
        assert_eq!(ids(&sorted), vec![2, 1, 4, 3, 5]);

        let mut by_compare: Vec<&Domain> = current.domains.iter().collect();
        by_compare.sort_by(|a, b| FieldId::CpuPct.compare(&cx, a, b));
        assert_eq!(ids(&sorted), ids(&by_compare));
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let current = Snapshot {
            domains: vec![domain(0, "Zeta", 0), domain(1, "alpha", 0)],
            ..Snapshot::default()
        };
        let cx = ctx(&current, None);
        let sorted = sort_domains(&cx, FieldId::Name);
        let names: Vec<&str> = sorted.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zeta"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let current = Snapshot {
            domains: vec![domain(5, "e", 1), domain(3, "c", 1), domain(9, "i", 1)],
            ..Snapshot::default()
        };
        let cx = ctx(&current, None);
        // No previous snapshot: every CPU% is 0.0.
        let sorted = sort_domains(&cx, FieldId::CpuPct);
        assert_eq!(ids(&sorted), vec![5, 3, 9]);
    }

    #[test]
    fn test_visible_window() {
        assert_eq!(visible(vec![1, 2, 3, 4], 0), vec![1, 2, 3, 4]);
        assert_eq!(visible(vec![1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(visible(vec![1, 2, 3, 4], 99), vec![4]);
        assert_eq!(visible(Vec::<u32>::new(), 3), Vec::<u32>::new());
    }

    #[test]
    fn test_sort_state_apply() {
        let current = Snapshot {
            domains: vec![domain(0, "a", 3), domain(1, "b", 9), domain(2, "c", 5)],
            ..Snapshot::default()
        };
        let cx = ctx(&current, None);
        let state = SortState {
            field: FieldId::Cpu,
            first_domain: 1,
        };
        assert_eq!(ids(&state.apply(&cx)), vec![2, 0]);
    }
}
