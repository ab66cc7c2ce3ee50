use std::fmt;

use coilgun_core::{GroupId, LabelPosition};
use serde::{Deserialize, Serialize};
use uom::si::{
    electrical_resistance::ohm,
    f64::{ElectricPotential, ElectricalResistance, Length, Time},
    length::meter,
};

/// Ordinal identity of a coil, starting at 1 for the breech-most coil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoilId(usize);

impl CoilId {
    /// Returns the id for the coil stored at `index` in a bank.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// The one-based ordinal.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self.0
    }

    /// The zero-based index into the bank.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// The id of the following coil.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CoilId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coil {}", self.0)
    }
}

/// How a coil's winding resistance is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoilResistance {
    /// A measured value, independent of the turn count.
    Fixed(ElectricalResistance),

    /// Wire resistance accumulated over every turn.
    Wire {
        /// Resistance per metre of wire, in ohms per metre.
        ohms_per_meter: f64,

        /// Length of wire in one turn.
        turn_length: Length,
    },
}

impl CoilResistance {
    /// Resolves the winding resistance for a coil with `turns` turns.
    #[must_use]
    pub fn resolve(&self, turns: u32) -> ElectricalResistance {
        match *self {
            Self::Fixed(resistance) => resistance,
            Self::Wire {
                ohms_per_meter,
                turn_length,
            } => ElectricalResistance::new::<ohm>(
                ohms_per_meter * turn_length.get::<meter>() * f64::from(turns),
            ),
        }
    }
}

/// Static description of a drive coil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilSpec {
    /// Point that selects the coil's winding block in the solver geometry.
    pub label: LabelPosition,

    /// Axial position of the coil's center.
    pub center: Length,

    /// Number of winding turns.
    pub turns: u32,

    pub resistance: CoilResistance,

    /// Initial voltage of the capacitor bank feeding this coil.
    pub voltage: ElectricPotential,

    /// Solver group of the coil body.
    pub group: GroupId,

    /// How far ahead of the center the projectile's leading edge may be when
    /// the coil is allowed to energize.
    pub threshold: Length,
}

/// A completed energizing interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub on: Time,
    pub off: Time,
}

impl Pulse {
    #[must_use]
    pub fn duration(&self) -> Time {
        self.off - self.on
    }
}

/// Firing state of a coil.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CoilState {
    /// Not yet reached in the firing sequence.
    #[default]
    Pending,

    /// Selected as the current coil, waiting for the projectile to cross its threshold.
    CurrentUnarmed,

    /// Energized since the given time.
    Active { since: Time },

    /// Shut down for good.
    ///
    /// `pulse` is `None` when the coil was de-energized without ever having
    /// been legitimately fired.
    Spent { pulse: Option<Pulse> },
}

impl CoilState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub fn is_spent(&self) -> bool {
        matches!(self, Self::Spent { .. })
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the time the coil was energized, if it ever was legitimately.
    #[must_use]
    pub fn power_on_time(&self) -> Option<Time> {
        match self {
            Self::Active { since } => Some(*since),
            Self::Spent { pulse: Some(pulse) } => Some(pulse.on),
            _ => None,
        }
    }

    /// Returns the time the coil completed its pulse, if it did.
    #[must_use]
    pub fn shutdown_time(&self) -> Option<Time> {
        match self {
            Self::Spent { pulse: Some(pulse) } => Some(pulse.off),
            _ => None,
        }
    }
}

/// A coil in a bank: its identity, description, and firing state.
#[derive(Debug, Clone, PartialEq)]
pub struct Coil {
    id: CoilId,
    spec: CoilSpec,
    resistance: ElectricalResistance,
    state: CoilState,
}

impl Coil {
    pub(crate) fn new(id: CoilId, spec: CoilSpec) -> Self {
        let resistance = spec.resistance.resolve(spec.turns);
        Self {
            id,
            spec,
            resistance,
            state: CoilState::Pending,
        }
    }

    #[must_use]
    pub fn id(&self) -> CoilId {
        self.id
    }

    #[must_use]
    pub fn spec(&self) -> &CoilSpec {
        &self.spec
    }

    #[must_use]
    pub fn center(&self) -> Length {
        self.spec.center
    }

    #[must_use]
    pub fn threshold(&self) -> Length {
        self.spec.threshold
    }

    /// Winding resistance, resolved from the [`CoilSpec`] at construction.
    #[must_use]
    pub fn resistance(&self) -> ElectricalResistance {
        self.resistance
    }

    #[must_use]
    pub fn state(&self) -> CoilState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: CoilState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{length::inch, time::millisecond};

    #[test]
    fn wire_resistance_scales_with_turns() {
        let resistance = CoilResistance::Wire {
            ohms_per_meter: 0.021,
            turn_length: Length::new::<meter>(0.3),
        };
        assert_relative_eq!(resistance.resolve(100).get::<ohm>(), 0.63, epsilon = 1e-12);
        assert_relative_eq!(resistance.resolve(200).get::<ohm>(), 1.26, epsilon = 1e-12);
    }

    #[test]
    fn fixed_resistance_ignores_turns() {
        let resistance = CoilResistance::Fixed(ElectricalResistance::new::<ohm>(3.7));
        assert_relative_eq!(resistance.resolve(500).get::<ohm>(), 3.7);
        assert_relative_eq!(resistance.resolve(1).get::<ohm>(), 3.7);
    }

    #[test]
    fn ids_are_one_based() {
        let id = CoilId::from_index(0);
        assert_eq!(id.ordinal(), 1);
        assert_eq!(id.index(), 0);
        assert_eq!(id.next().ordinal(), 2);
        assert_eq!(id.to_string(), "coil 1");
    }

    #[test]
    fn state_timestamps() {
        let on = Time::new::<millisecond>(12.0);
        let off = Time::new::<millisecond>(43.0);
        let pulse = Pulse { on, off };

        assert_eq!(CoilState::Pending.power_on_time(), None);
        assert_eq!(CoilState::Active { since: on }.power_on_time(), Some(on));
        assert_eq!(CoilState::Active { since: on }.shutdown_time(), None);
        assert_eq!(CoilState::Spent { pulse: Some(pulse) }.shutdown_time(), Some(off));
        assert_eq!(CoilState::Spent { pulse: None }.power_on_time(), None);
        assert_relative_eq!(pulse.duration().get::<millisecond>(), 31.0, epsilon = 1e-9);
    }

    #[test]
    fn coil_resolves_resistance_once() {
        let spec = CoilSpec {
            label: LabelPosition {
                radial: Length::new::<inch>(1.7345),
                axial: Length::new::<inch>(2.0),
            },
            center: Length::new::<inch>(2.0),
            turns: 500,
            resistance: CoilResistance::Fixed(ElectricalResistance::new::<ohm>(3.7)),
            voltage: ElectricPotential::new::<uom::si::electric_potential::volt>(500.0),
            group: GroupId(2),
            threshold: Length::new::<inch>(0.0),
        };
        let coil = Coil::new(CoilId::from_index(0), spec);
        assert_relative_eq!(coil.resistance().get::<ohm>(), 3.7);
        assert!(coil.state().is_pending());
    }
}
