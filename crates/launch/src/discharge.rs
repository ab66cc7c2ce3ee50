use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    capacitance::farad,
    electric_current::ampere,
    electric_potential::volt,
    electrical_resistance::ohm,
    f64::{Capacitance, ElectricCurrent, ElectricPotential, ElectricalResistance, Time},
    time::second,
};

/// Errors that can occur when describing a [`DischargeCircuit`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CircuitError {
    #[error("bank capacitance must be positive, got {0} F")]
    Capacitance(f64),

    #[error("series discharge resistance must be non-negative, got {0} Ω")]
    SeriesResistance(f64),

    #[error("total circuit resistance must be positive, got {0} Ω")]
    TotalResistance(f64),
}

/// A capacitor bank discharging through a coil and a series resistor.
///
/// The current follows the RC decay
///
/// ```text
/// I(t) = V0 · exp(−t / (R·C)) / R
/// ```
///
/// where `R` is the coil resistance plus the series resistance and `t` is the
/// time since the coil energized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DischargeCircuit {
    capacitance: Capacitance,
    series_resistance: ElectricalResistance,
}

impl DischargeCircuit {
    /// Creates a discharge circuit.
    ///
    /// # Errors
    ///
    /// Returns a [`CircuitError`] if the capacitance is not positive or the
    /// series resistance is negative.
    pub fn new(
        capacitance: Capacitance,
        series_resistance: ElectricalResistance,
    ) -> Result<Self, CircuitError> {
        let circuit = Self {
            capacitance,
            series_resistance,
        };
        circuit.check()?;
        Ok(circuit)
    }

    /// Re-checks the invariants of [`DischargeCircuit::new`].
    ///
    /// Deserialized circuits bypass the constructor.
    ///
    /// # Errors
    ///
    /// See [`DischargeCircuit::new`].
    pub fn check(&self) -> Result<(), CircuitError> {
        let capacitance = self.capacitance.get::<farad>();
        if !(capacitance.is_finite() && capacitance > 0.0) {
            return Err(CircuitError::Capacitance(capacitance));
        }
        let series = self.series_resistance.get::<ohm>();
        if !(series.is_finite() && series >= 0.0) {
            return Err(CircuitError::SeriesResistance(series));
        }
        Ok(())
    }

    #[must_use]
    pub fn capacitance(&self) -> Capacitance {
        self.capacitance
    }

    #[must_use]
    pub fn series_resistance(&self) -> ElectricalResistance {
        self.series_resistance
    }

    /// Total resistance seen by the bank when it drives a coil.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitError::TotalResistance`] if the total is not positive.
    pub fn total_resistance(
        &self,
        coil_resistance: ElectricalResistance,
    ) -> Result<ElectricalResistance, CircuitError> {
        let total = coil_resistance + self.series_resistance;
        let ohms = total.get::<ohm>();
        if ohms.is_finite() && ohms > 0.0 {
            Ok(total)
        } else {
            Err(CircuitError::TotalResistance(ohms))
        }
    }

    /// The RC time constant for a coil.
    #[must_use]
    pub fn time_constant(&self, coil_resistance: ElectricalResistance) -> Time {
        let resistance = (coil_resistance + self.series_resistance).get::<ohm>();
        Time::new::<second>(resistance * self.capacitance.get::<farad>())
    }

    /// Instantaneous current `elapsed` after a bank charged to `voltage`
    /// started discharging through a coil of `coil_resistance`.
    ///
    /// Callers ensure the total resistance is positive; see
    /// [`total_resistance`](Self::total_resistance).
    #[must_use]
    pub fn current(
        &self,
        voltage: ElectricPotential,
        coil_resistance: ElectricalResistance,
        elapsed: Time,
    ) -> ElectricCurrent {
        let resistance = (coil_resistance + self.series_resistance).get::<ohm>();
        let tau = resistance * self.capacitance.get::<farad>();
        let decay = (-elapsed.get::<second>() / tau).exp();
        ElectricCurrent::new::<ampere>(voltage.get::<volt>() * decay / resistance)
    }
}
