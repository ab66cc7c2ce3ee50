use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::{
    ConstZero,
    si::{
        f64::{Length, Mass, Time},
        time::second,
    },
};

use crate::{
    BankError, CircuitError, CoilBank, CoilId, CoilSpec, DischargeCircuit, Drag, Friction,
    ProjectileSpec, TimingError,
};

/// Errors that can occur when validating a [`LaunchConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("timestep must be positive and finite, got {0} s")]
    Timestep(f64),

    #[error("max time must be positive and finite, got {0} s")]
    MaxTime(f64),

    #[error(transparent)]
    Bank(#[from] BankError),

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error("{coil}: {source}")]
    CoilCircuit {
        coil: CoilId,
        #[source]
        source: CircuitError,
    },

    #[error("{which} mass must be positive")]
    Mass { which: &'static str },

    #[error("circuit name must not be empty")]
    CircuitName,

    #[error(transparent)]
    Timing(#[from] TimingError),
}

/// Fixed-step time discretization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub dt: Time,
    pub max_time: Time,
}

impl Timing {
    /// Creates validated timing.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either value is not positive and finite.
    pub fn new(dt: Time, max_time: Time) -> Result<Self, ConfigError> {
        let timing = Self { dt, max_time };
        timing.check()?;
        Ok(timing)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let dt = self.dt.get::<second>();
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::Timestep(dt));
        }
        let max_time = self.max_time.get::<second>();
        if !(max_time.is_finite() && max_time > 0.0) {
            return Err(ConfigError::MaxTime(max_time));
        }
        Ok(())
    }
}

/// Everything the kernel needs for one launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Drive coils, breech to muzzle.
    pub coils: Vec<CoilSpec>,

    pub circuit: DischargeCircuit,

    /// Name of the solver circuit the energized coil is attached to.
    pub circuit_name: String,

    pub projectile: ProjectileSpec,
    pub drag: Drag,
    pub friction: Friction,
    pub timing: Timing,

    /// The run ends once the projectile center reaches this position.
    pub end_position: Length,
}

impl LaunchConfig {
    /// Validates the configuration and builds its coil bank.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn bank(&self) -> Result<CoilBank, ConfigError> {
        self.timing.check()?;
        self.circuit.check()?;

        if self.circuit_name.trim().is_empty() {
            return Err(ConfigError::CircuitName);
        }
        if self.projectile.body.mass <= Mass::ZERO {
            return Err(ConfigError::Mass { which: "projectile" });
        }
        if self
            .projectile
            .release
            .is_some_and(|payload| payload.mass <= Mass::ZERO)
        {
            return Err(ConfigError::Mass { which: "payload" });
        }

        let bank = CoilBank::new(self.coils.iter().cloned())?;
        for coil in bank.coils() {
            self.circuit
                .total_resistance(coil.resistance())
                .map_err(|source| ConfigError::CoilCircuit {
                    coil: coil.id(),
                    source,
                })?;
        }

        Ok(bank)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{electrical_resistance::ohm, f64::ElectricalResistance, mass::kilogram};

    use super::test_support::bare;
    use crate::{CoilResistance, bank::test_support::coil_at};

    #[test]
    fn valid_config_builds_a_pending_bank() {
        let bank = bare(0.01, 2.0, 10.0).bank().unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.coils()[0].state().is_pending());
    }

    #[test]
    fn rejects_bad_timing() {
        let mut config = bare(0.0, 2.0, 10.0);
        assert_eq!(config.bank(), Err(ConfigError::Timestep(0.0)));

        config.timing.dt = Time::new::<second>(0.01);
        config.timing.max_time = Time::new::<second>(-1.0);
        assert_eq!(config.bank(), Err(ConfigError::MaxTime(-1.0)));
    }

    #[test]
    fn rejects_massless_bodies() {
        let mut config = bare(0.01, 2.0, 10.0);
        config.projectile.body.mass = Mass::new::<kilogram>(0.0);
        assert_eq!(
            config.bank(),
            Err(ConfigError::Mass {
                which: "projectile"
            })
        );
    }

    #[test]
    fn rejects_shorted_coils() {
        let mut config = bare(0.01, 2.0, 10.0);
        config.circuit =
            DischargeCircuit::new(config.circuit.capacitance(), ElectricalResistance::ZERO)
                .unwrap();
        let mut shorted = coil_at(2000.0, 0.0);
        shorted.resistance = CoilResistance::Fixed(ElectricalResistance::new::<ohm>(0.0));
        config.coils.push(shorted);

        assert!(matches!(
            config.bank(),
            Err(ConfigError::CoilCircuit { coil, .. }) if coil == CoilId::from_index(1)
        ));
    }

    #[test]
    fn rejects_unordered_coils() {
        let mut config = bare(0.01, 2.0, 10.0);
        config.coils.push(coil_at(1.0, 0.0));
        assert!(matches!(
            config.bank(),
            Err(ConfigError::Bank(BankError::Unordered { .. }))
        ));
    }
}
