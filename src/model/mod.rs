//! Data model shared by the backends, the field registry and the renderers.

pub mod domain;
pub mod snapshot;

pub use domain::{
    Domain, DomainFlags, DomainState, NetDirection, NetworkInfo, TmemInfo, UNLIMITED_MEMORY,
    VbdCounter, VbdInfo, VbdKind, VcpuInfo,
};
pub use snapshot::{NodeInfo, Sample, Snapshot};
