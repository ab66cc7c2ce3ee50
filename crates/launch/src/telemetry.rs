use serde::{Deserialize, Serialize};
use uom::si::f64::{ElectricCurrent, Force, Length, Time, Velocity};

/// State recorded at the start of one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: Time,
    pub position: Length,
    pub velocity: Velocity,
    pub coil_force: Force,
    pub drag_force: Force,
    pub current: ElectricCurrent,
}

/// Append-only time series of [`Sample`]s, one per step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySeries {
    samples: Vec<Sample>,
}

impl TelemetrySeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn times(&self) -> impl Iterator<Item = Time> + '_ {
        self.samples.iter().map(|s| s.time)
    }

    pub fn positions(&self) -> impl Iterator<Item = Length> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    pub fn velocities(&self) -> impl Iterator<Item = Velocity> + '_ {
        self.samples.iter().map(|s| s.velocity)
    }

    pub fn coil_forces(&self) -> impl Iterator<Item = Force> + '_ {
        self.samples.iter().map(|s| s.coil_force)
    }

    pub fn drag_forces(&self) -> impl Iterator<Item = Force> + '_ {
        self.samples.iter().map(|s| s.drag_force)
    }

    pub fn currents(&self) -> impl Iterator<Item = ElectricCurrent> + '_ {
        self.samples.iter().map(|s| s.current)
    }

    /// Highest recorded velocity, or `None` for an empty series.
    #[must_use]
    pub fn max_velocity(&self) -> Option<Velocity> {
        self.velocities()
            .reduce(|best, v| if v > best { v } else { best })
    }

    /// Farthest recorded position, or `None` for an empty series.
    #[must_use]
    pub fn max_position(&self) -> Option<Length> {
        self.positions()
            .reduce(|best, x| if x > best { x } else { best })
    }
}

impl<'a> IntoIterator for &'a TelemetrySeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use uom::{
        ConstZero,
        si::{
            f64::{ElectricCurrent, Force, Length, Time, Velocity},
            length::meter,
            time::second,
            velocity::meter_per_second,
        },
    };

    use super::{Sample, TelemetrySeries};

    /// Builds a series from `(time, position, velocity)` triples in SI units.
    pub(crate) fn series(points: &[(f64, f64, f64)]) -> TelemetrySeries {
        let mut series = TelemetrySeries::new();
        for &(time, position, velocity) in points {
            series.push(Sample {
                time: Time::new::<second>(time),
                position: Length::new::<meter>(position),
                velocity: Velocity::new::<meter_per_second>(velocity),
                coil_force: Force::ZERO,
                drag_force: Force::ZERO,
                current: ElectricCurrent::ZERO,
            });
        }
        series
    }
}
