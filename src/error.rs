//! Error types, one enum per concern.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid monitor configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("interval must be greater than zero")]
    NonPositiveInterval,

    #[error("unknown identifier mode '{0}' (expected name, full or id)")]
    UnknownIdentifier(String),

    #[error("unknown output type '{0}' (expected org, csv or json)")]
    UnknownOutput(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Failure of the statistics backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to initialize statistics backend: {0}")]
    Init(String),

    #[error("failed to retrieve statistics: {0}")]
    Fetch(String),

    #[error("failed to read recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse recording {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No more recorded snapshots. Not a failure for the monitor loop.
    #[error("end of recording")]
    Exhausted,
}

impl BackendError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, BackendError::Exhausted)
    }
}

/// Failure to produce one tick's output. The tick is skipped.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize structured output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fatal failure of the monitor loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigError::NonPositiveInterval.to_string(),
            "interval must be greater than zero"
        );
        assert_eq!(
            BackendError::Fetch("hypervisor unreachable".into()).to_string(),
            "failed to retrieve statistics: hypervisor unreachable"
        );
        let wrapped: MonitorError = BackendError::Exhausted.into();
        assert_eq!(wrapped.to_string(), "end of recording");
    }

    #[test]
    fn test_is_exhausted() {
        assert!(BackendError::Exhausted.is_exhausted());
        assert!(!BackendError::Init("x".into()).is_exhausted());
    }
}
