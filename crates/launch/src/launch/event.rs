use uom::si::f64::{Length, Time};

use crate::{ForceBreakdown, Sample, Transition};

/// Event emitted by the launch stepper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A coil changed firing state.
    Transition { time: Time, transition: Transition },

    /// The payload separated from the armature.
    PayloadReleased { time: Time, position: Length },

    /// A step completed.
    ///
    /// `sample` is the state at the start of the step and `forces` the forces
    /// applied over it. Steps are numbered from 1.
    Step {
        step: usize,
        sample: Sample,
        forces: ForceBreakdown,
    },
}

impl Event {
    /// Simulation time the event refers to.
    #[must_use]
    pub fn time(&self) -> Time {
        match self {
            Self::Transition { time, .. } | Self::PayloadReleased { time, .. } => *time,
            Self::Step { sample, .. } => sample.time,
        }
    }
}
