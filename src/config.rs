//! Validated monitor configuration.
//!
//! The binary builds a `MonitorConfig` from its command line; tests build
//! one directly. Either way `validate` runs before the loop starts.

use std::time::Duration;

use crate::error::ConfigError;
use crate::fields::IdentMode;
use crate::render::{DisplaySettings, OutputKind};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Delay between ticks.
    pub interval: Duration,
    /// Number of ticks to run; 0 runs until stopped.
    pub iterations: u64,
    pub ident: IdentMode,
    pub output: OutputKind,
    pub display: DisplaySettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            iterations: 0,
            ident: IdentMode::default(),
            output: OutputKind::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::NonPositiveInterval);
        }
        Ok(())
    }

    /// Whether the loop runs until stopped externally.
    pub fn is_unbounded(&self) -> bool {
        self.iterations == 0
    }
}

/// Converts an interval given in (possibly fractional) seconds.
pub fn interval_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::NonPositiveInterval);
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(ConfigError::NonPositiveInterval),
    }
}
