//! Statistics backends.
//!
//! The monitor reads node snapshots only through the `StatsBackend` trait.
//!
//! # Architecture
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │     Monitor     │
//!                  └────────┬────────┘
//!                           │
//!                  ┌────────▼────────┐
//!                  │  StatsBackend   │ (trait)
//!                  └────────┬────────┘
//!                           │
//!              ┌────────────┴────────────┐
//!              │                         │
//!       ┌──────▼──────┐          ┌───────▼───────┐
//!       │ReplayBackend│          │  MockBackend  │
//!       │ (recording) │          │ (simulation,  │
//!       └─────────────┘          │  test script) │
//!                                └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use domtop::collector::{ReplayBackend, StatsBackend};
//!
//! let mut backend = ReplayBackend::from_path("session.json")?;
//! let snapshot = backend.fetch_snapshot()?;
//! ```

pub mod mock;
pub mod replay;
pub mod traits;

pub use mock::MockBackend;
pub use replay::ReplayBackend;
pub use traits::StatsBackend;
