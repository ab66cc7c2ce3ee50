use uom::{ConstZero, si::f64::Time};

use crate::Precision;

/// Fixed-step simulation clock.
///
/// Tracks elapsed time and the time since the most recent coil activation,
/// which drives the capacitor discharge model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    time: Time,
    dt: Time,
    max_time: Time,
    since_activation: Time,
    precision: Precision,
}

impl SimulationClock {
    /// Creates a clock at `t = 0`.
    ///
    /// Callers validate that `dt` and `max_time` are positive; see
    /// [`Timing`](crate::Timing).
    #[must_use]
    pub fn new(dt: Time, max_time: Time) -> Self {
        Self {
            time: Time::ZERO,
            dt,
            max_time,
            since_activation: Time::ZERO,
            precision: Precision::from_step(dt),
        }
    }

    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    #[must_use]
    pub fn dt(&self) -> Time {
        self.dt
    }

    #[must_use]
    pub fn max_time(&self) -> Time {
        self.max_time
    }

    /// Time elapsed since the last coil became active.
    #[must_use]
    pub fn since_activation(&self) -> Time {
        self.since_activation
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Returns `true` once the clock has reached its maximum time.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.time >= self.max_time
    }

    /// Restarts the discharge timer for a newly active coil.
    pub fn reset_activation(&mut self) {
        self.since_activation = Time::ZERO;
    }

    /// Advances by one step.
    ///
    /// Elapsed time is rounded to the step precision; the activation timer is not.
    pub fn advance(&mut self) {
        self.time = self.precision.round_time(self.time + self.dt);
        self.since_activation += self.dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::time::{millisecond, second};

    #[test]
    fn advancing_stays_on_the_step_grid() {
        let mut clock = SimulationClock::new(Time::new::<millisecond>(1.0), Time::new::<second>(1.0));
        for _ in 0..1000 {
            clock.advance();
        }
        assert_eq!(clock.time().get::<second>(), 1.0);
        assert!(clock.expired());
    }

    #[test]
    fn activation_timer_resets_independently() {
        let mut clock = SimulationClock::new(Time::new::<second>(0.01), Time::new::<second>(2.0));
        clock.advance();
        clock.advance();
        clock.reset_activation();
        clock.advance();

        assert_relative_eq!(clock.time().get::<second>(), 0.03);
        assert_relative_eq!(clock.since_activation().get::<second>(), 0.01);
        assert!(!clock.expired());
    }
}
