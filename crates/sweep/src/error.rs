use coilgun_core::SessionError;
use coilgun_launch::{ConfigError, TimingError, launch};
use thiserror::Error;

/// Errors that can occur when reading or checking a [`SweepConfig`](crate::SweepConfig).
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid sweep file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("parameter `{0}` has no values")]
    EmptyParameter(&'static str),

    #[error("cutoff firing has not been validated for the rig's wound turn counts")]
    CutoffWithRigTurns,

    #[error("the fitted drag curve is only valid submerged")]
    EmpiricalDragDry,

    #[error("manual schedule needs {expected} pulse durations, got {got}")]
    TimingLength { expected: usize, got: usize },

    #[error(transparent)]
    Timing(#[from] TimingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that can occur while running a batch.
///
/// Every variant but [`BatchError::Sweep`] carries the zero-based index of the
/// combination that failed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("run {index}: {source}")]
    Open {
        index: usize,
        #[source]
        source: SessionError,
    },

    #[error("run {index}: {source}")]
    Launch {
        index: usize,
        #[source]
        source: launch::Error,
    },

    #[error("run {index}: {source}")]
    Close {
        index: usize,
        #[source]
        source: SessionError,
    },
}
