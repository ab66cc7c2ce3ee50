use uom::si::f64::{Length, Time, Velocity};

use crate::{
    Coil, ExitError, Precision, PulseReport, TelemetrySeries, exit_velocity, pulse_reports,
};

/// Indicates how a launch terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The projectile reached the end position.
    ReachedEnd,

    /// The clock reached the maximum time.
    TimeLimit,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a launch.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the launch terminated.
    pub status: Status,

    /// One sample per step.
    pub telemetry: TelemetrySeries,

    /// Final coil states.
    pub coils: Vec<Coil>,

    /// When the payload released, if it did.
    pub released_at: Option<Time>,

    /// Number of steps completed.
    pub steps: usize,

    /// Rounding applied to times and currents during the run.
    pub precision: Precision,
}

impl Solution {
    /// Recorded velocity where the projectile first passed `threshold`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExitError`] if the threshold was never passed.
    pub fn exit_velocity(&self, threshold: Length) -> Result<Velocity, ExitError> {
        exit_velocity(&self.telemetry, threshold)
    }

    #[must_use]
    pub fn max_velocity(&self) -> Option<Velocity> {
        self.telemetry.max_velocity()
    }

    /// Pulse timing per coil.
    #[must_use]
    pub fn pulses(&self) -> Vec<PulseReport> {
        pulse_reports(&self.coils, self.precision)
    }
}
