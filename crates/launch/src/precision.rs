use uom::si::{
    electric_current::ampere,
    f64::{ElectricCurrent, Time},
    time::second,
};

/// Decimal precision derived from the simulation timestep.
///
/// The clock and the reported discharge current are rounded to as many
/// decimal places as the timestep has in seconds, so a 1 ms step rounds to
/// three places. Rounding keeps accumulated time on the step grid and avoids
/// feeding the solver currents that differ only in float noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    decimals: u8,
}

impl Precision {
    /// The largest number of decimal places a timestep can resolve to.
    pub const MAX_DECIMALS: u8 = 12;

    /// Creates a precision with an explicit number of decimal places.
    ///
    /// Values above [`Self::MAX_DECIMALS`] are clamped.
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals.min(Self::MAX_DECIMALS),
        }
    }

    /// Derives the precision from a timestep.
    ///
    /// Counts the decimal places needed to write `dt` in seconds, with a
    /// minimum of one (a whole-second step still rounds to tenths).
    #[must_use]
    pub fn from_step(dt: Time) -> Self {
        let dt = dt.get::<second>().abs();
        let decimals = (1..=Self::MAX_DECIMALS)
            .find(|&places| {
                let scaled = dt * pow10(places);
                (scaled - scaled.round()).abs() <= 1e-9 * scaled.max(1.0)
            })
            .unwrap_or(Self::MAX_DECIMALS);
        Self { decimals }
    }

    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Rounds a plain value to this precision.
    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        let scale = pow10(self.decimals);
        (value * scale).round() / scale
    }

    #[must_use]
    pub fn round_time(&self, time: Time) -> Time {
        Time::new::<second>(self.round(time.get::<second>()))
    }

    #[must_use]
    pub fn round_current(&self, current: ElectricCurrent) -> ElectricCurrent {
        ElectricCurrent::new::<ampere>(self.round(current.get::<ampere>()))
    }
}

fn pow10(places: u8) -> f64 {
    10f64.powi(i32::from(places))
}
