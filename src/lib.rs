//! domtop - resource monitor for hypervisor domains.
//!
//! This library provides the pieces the `domtop` binary is assembled from:
//! - `collector` - statistics backends (recorded sessions, simulated nodes)
//! - `fields` - the registry of sortable, renderable per-domain columns
//! - `rates` - percentages derived from two consecutive samples
//! - `render` - text, CSV and JSON output over one shared traversal
//! - `monitor` - the periodic sampling loop

pub mod collector;
pub mod config;
pub mod error;
pub mod fields;
pub mod fmt;
pub mod model;
pub mod monitor;
pub mod provider;
pub mod rates;
pub mod render;
pub mod table;

pub use config::MonitorConfig;
pub use error::{BackendError, ConfigError, MonitorError, RenderError};
pub use monitor::{Monitor, StopReason};
