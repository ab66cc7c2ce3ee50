//! Coil firing strategies.
//!
//! A [`FiringMode`] owns the coil state machine: it decides, each step, which
//! coils energize and which shut down, and reports every change as a
//! [`Transition`] so the stepper can mirror it onto the solver.

mod cutoff;
mod manual;
mod sequential;

pub use cutoff::SequentialCutoff;
pub use manual::{Manual, TimingError, TimingTable};
pub use sequential::Sequential;

use uom::si::f64::{Length, Time};

use crate::{CoilBank, CoilId, CoilState, Precision, Pulse};

/// What a firing mode sees when it updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiringContext {
    /// Current simulation time.
    pub time: Time,

    /// Projectile center position.
    pub position: Length,

    /// Half the projectile length; `position + half_length` is the leading edge.
    pub half_length: Length,

    pub precision: Precision,
}

impl FiringContext {
    #[must_use]
    pub fn leading_edge(&self) -> Length {
        self.position + self.half_length
    }
}

/// A change to one coil's firing state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// The coil became the current coil and waits for its threshold.
    Armed(CoilId),

    /// The coil energized.
    Activated { coil: CoilId, at: Time },

    /// The coil completed its pulse.
    ShutDown { coil: CoilId, pulse: Pulse },

    /// The coil was de-energized without a recorded pulse.
    Discarded(CoilId),
}

impl Transition {
    #[must_use]
    pub fn coil(&self) -> CoilId {
        match *self {
            Self::Armed(coil) | Self::Discarded(coil) => coil,
            Self::Activated { coil, .. } | Self::ShutDown { coil, .. } => coil,
        }
    }

    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Activated { .. })
    }
}

/// A coil switching strategy.
pub trait FiringMode {
    /// Checks that the mode can drive `bank`.
    ///
    /// # Errors
    ///
    /// Returns a [`TimingError`] if the mode's parameters do not fit the bank.
    fn validate(&self, _bank: &CoilBank) -> Result<(), TimingError> {
        Ok(())
    }

    /// Sets the initial coil states at the start of a run.
    fn initialize(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition>;

    /// Advances the coil states for one step.
    fn update(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition>;
}

/// The built-in firing modes.
#[derive(Debug, Clone, PartialEq)]
pub enum Firing {
    Sequential(Sequential),
    SequentialCutoff(SequentialCutoff),
    Manual(Manual),
}

impl Firing {
    #[must_use]
    pub fn sequential() -> Self {
        Self::Sequential(Sequential)
    }

    #[must_use]
    pub fn cutoff() -> Self {
        Self::SequentialCutoff(SequentialCutoff)
    }

    #[must_use]
    pub fn manual(table: TimingTable) -> Self {
        Self::Manual(Manual::new(table))
    }
}

impl Default for Firing {
    fn default() -> Self {
        Self::sequential()
    }
}

impl FiringMode for Firing {
    fn validate(&self, bank: &CoilBank) -> Result<(), TimingError> {
        match self {
            Self::Sequential(mode) => mode.validate(bank),
            Self::SequentialCutoff(mode) => mode.validate(bank),
            Self::Manual(mode) => mode.validate(bank),
        }
    }

    fn initialize(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        match self {
            Self::Sequential(mode) => mode.initialize(bank, context),
            Self::SequentialCutoff(mode) => mode.initialize(bank, context),
            Self::Manual(mode) => mode.initialize(bank, context),
        }
    }

    fn update(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        match self {
            Self::Sequential(mode) => mode.update(bank, context),
            Self::SequentialCutoff(mode) => mode.update(bank, context),
            Self::Manual(mode) => mode.update(bank, context),
        }
    }
}

fn arm(bank: &mut CoilBank, coil: CoilId, transitions: &mut Vec<Transition>) {
    bank.set_state(coil, CoilState::CurrentUnarmed);
    transitions.push(Transition::Armed(coil));
}

fn activate(bank: &mut CoilBank, coil: CoilId, at: Time, transitions: &mut Vec<Transition>) {
    bank.set_state(coil, CoilState::Active { since: at });
    transitions.push(Transition::Activated { coil, at });
}

/// Completes the pulse of an active coil. Does nothing to inactive coils.
fn shut_down(bank: &mut CoilBank, coil: CoilId, at: Time, transitions: &mut Vec<Transition>) {
    if let Some(CoilState::Active { since }) = bank.get(coil).map(|c| c.state()) {
        let pulse = Pulse { on: since, off: at };
        bank.set_state(coil, CoilState::Spent { pulse: Some(pulse) });
        transitions.push(Transition::ShutDown { coil, pulse });
    }
}

fn discard(bank: &mut CoilBank, coil: CoilId, transitions: &mut Vec<Transition>) {
    bank.set_state(coil, CoilState::Spent { pulse: None });
    transitions.push(Transition::Discarded(coil));
}

#[cfg(test)]
pub(crate) mod test_support {
    use uom::si::{f64::Length, f64::Time, length::meter, time::second};

    use super::FiringContext;
    use crate::Precision;

    /// A context for a projectile of zero length at `position` meters.
    pub(crate) fn at(time: f64, position: f64) -> FiringContext {
        FiringContext {
            time: Time::new::<second>(time),
            position: Length::new::<meter>(position),
            half_length: Length::new::<meter>(0.0),
            precision: Precision::new(3),
        }
    }
}
