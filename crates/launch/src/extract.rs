//! Post-run extraction of exit velocity and coil pulse timing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::{Length, Time, Velocity},
    length::meter,
};

use crate::{Coil, CoilId, CoilState, Precision, Pulse, Sample, TelemetrySeries};

/// Errors that can occur when extracting the exit velocity.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ExitError {
    #[error("no samples were recorded")]
    NoSamples,

    #[error(
        "projectile never passed the exit at {} m (farthest {} m)",
        .threshold.get::<meter>(),
        .farthest.get::<meter>()
    )]
    NotReached { threshold: Length, farthest: Length },
}

/// Returns the first sample whose position is beyond `threshold`.
///
/// # Errors
///
/// Returns an [`ExitError`] if the series is empty or never crosses the threshold.
pub fn exit_sample(series: &TelemetrySeries, threshold: Length) -> Result<&Sample, ExitError> {
    let farthest = series.max_position().ok_or(ExitError::NoSamples)?;
    series
        .iter()
        .find(|sample| sample.position > threshold)
        .ok_or(ExitError::NotReached {
            threshold,
            farthest,
        })
}

/// The recorded velocity at the exit threshold.
///
/// # Errors
///
/// See [`exit_sample`].
pub fn exit_velocity(series: &TelemetrySeries, threshold: Length) -> Result<Velocity, ExitError> {
    exit_sample(series, threshold).map(|sample| sample.velocity)
}

/// How a coil's pulse ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseOutcome {
    /// Energized and shut down normally.
    Completed(Pulse),

    /// Still energized when the run ended.
    Truncated { since: Time },

    /// Never energized.
    NotFired,

    /// De-energized without a recorded pulse.
    Discarded,
}

impl PulseOutcome {
    #[must_use]
    pub fn from_state(state: CoilState) -> Self {
        match state {
            CoilState::Pending | CoilState::CurrentUnarmed => Self::NotFired,
            CoilState::Active { since } => Self::Truncated { since },
            CoilState::Spent { pulse: Some(pulse) } => Self::Completed(pulse),
            CoilState::Spent { pulse: None } => Self::Discarded,
        }
    }

    #[must_use]
    pub fn power_on(&self) -> Option<Time> {
        match self {
            Self::Completed(pulse) => Some(pulse.on),
            Self::Truncated { since } => Some(*since),
            Self::NotFired | Self::Discarded => None,
        }
    }

    #[must_use]
    pub fn shutdown(&self) -> Option<Time> {
        match self {
            Self::Completed(pulse) => Some(pulse.off),
            _ => None,
        }
    }
}

/// Pulse timing for one coil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseReport {
    pub coil: CoilId,
    pub outcome: PulseOutcome,

    /// Pulse length, for completed pulses.
    pub duration: Option<Time>,

    /// Gap between the previous coil's shutdown and this coil's power-on,
    /// when both happened.
    pub delay: Option<Time>,
}

/// Builds a [`PulseReport`] per coil, rounded to `precision`.
#[must_use]
pub fn pulse_reports(coils: &[Coil], precision: Precision) -> Vec<PulseReport> {
    let mut reports: Vec<PulseReport> = Vec::with_capacity(coils.len());
    for coil in coils {
        let outcome = PulseOutcome::from_state(coil.state());
        let previous_off = reports.last().and_then(|report| report.outcome.shutdown());
        let delay = match (previous_off, outcome.power_on()) {
            (Some(off), Some(on)) => Some(precision.round_time(on - off)),
            _ => None,
        };
        let duration = match outcome {
            PulseOutcome::Completed(pulse) => Some(precision.round_time(pulse.duration())),
            _ => None,
        };
        reports.push(PulseReport {
            coil: coil.id(),
            outcome,
            duration,
            delay,
        });
    }
    reports
}
