//! Rate and percentage computation from two consecutive samples.
//!
//! Every function here is total: missing previous data, counter regressions,
//! zero elapsed time and zero node memory all resolve to a defined value
//! instead of NaN or infinity.

use chrono::{DateTime, Utc};

use crate::model::{Domain, NodeInfo, Snapshot};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const NS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds to microseconds (÷1000) followed by ratio to percent (×100).
const NS_PER_US_PERCENT: f64 = 10.0;

// ---------------------------------------------------------------------------
// Delta helpers
// ---------------------------------------------------------------------------

/// Compute u64 delta, returning `None` on counter regression.
pub fn du64(curr: u64, prev: u64) -> Option<u64> {
    curr.checked_sub(prev)
}

/// Wall-clock time between two tick starts, in microseconds.
///
/// Negative when the clock went backwards; callers treat any value `<= 0`
/// as "no data".
pub fn elapsed_micros(current: DateTime<Utc>, previous: DateTime<Utc>) -> f64 {
    let delta = current.signed_duration_since(previous);
    match delta.num_microseconds() {
        Some(us) => us as f64,
        None => delta.num_milliseconds() as f64 * 1000.0,
    }
}

// ---------------------------------------------------------------------------
// Domain rates
// ---------------------------------------------------------------------------

/// CPU usage of `domain` over the last interval, as a percentage of one CPU.
///
/// Returns 0.0 when there is no previous snapshot, when the domain did not
/// exist in it, when its CPU counter went backwards (id reused), or when
/// `elapsed_us` is not positive.
pub fn cpu_percent(domain: &Domain, previous: Option<&Snapshot>, elapsed_us: f64) -> f64 {
    cpu_percent_since(
        domain,
        previous.and_then(|p| p.domain(domain.id)),
        elapsed_us,
    )
}

/// Same as [`cpu_percent`], given the domain's previous record directly.
pub fn cpu_percent_since(domain: &Domain, previous: Option<&Domain>, elapsed_us: f64) -> f64 {
    let Some(prev) = previous else {
        return 0.0;
    };
    if elapsed_us <= 0.0 || !elapsed_us.is_finite() {
        return 0.0;
    }
    match du64(domain.cpu_ns, prev.cpu_ns) {
        Some(delta) => delta as f64 / NS_PER_US_PERCENT / elapsed_us,
        None => 0.0,
    }
}

/// Share of total node memory, in percent. 0.0 when node memory is unknown.
pub fn mem_percent(bytes: u64, node: &NodeInfo) -> f64 {
    if node.tot_mem == 0 {
        return 0.0;
    }
    bytes as f64 / node.tot_mem as f64 * 100.0
}

/// Maximum memory as a share of node memory, `None` for unbounded domains.
pub fn max_mem_percent(domain: &Domain, node: &NodeInfo) -> Option<f64> {
    domain
        .has_memory_limit()
        .then(|| mem_percent(domain.max_mem, node))
}
