use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::{ConstZero, si::f64::Time};

use super::{FiringContext, FiringMode, Transition, activate, shut_down};
use crate::{CoilBank, CoilId, Pulse};

/// Errors that can occur when building or applying a [`TimingTable`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    #[error("timing table has no pulse durations")]
    Empty,

    #[error("{durations} pulse durations need {} inter-coil delays, got {delays}", .durations - 1)]
    DelayCount { durations: usize, delays: usize },

    #[error("{kind} {index} is negative")]
    Negative { kind: &'static str, index: usize },

    #[error("timing table covers {table} coils but the bank has {bank}")]
    CoilCount { table: usize, bank: usize },
}

/// Pulse durations and inter-coil delays for manual firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingTable {
    durations: Vec<Time>,
    delays: Vec<Time>,
}

impl TimingTable {
    /// Creates a timing table.
    ///
    /// `delays[k]` is the gap between the end of coil `k + 1`'s pulse and the
    /// start of coil `k + 2`'s.
    ///
    /// # Errors
    ///
    /// Returns a [`TimingError`] if there are no durations, the delay count is
    /// not one less than the duration count, or any value is negative.
    pub fn new(durations: Vec<Time>, delays: Vec<Time>) -> Result<Self, TimingError> {
        if durations.is_empty() {
            return Err(TimingError::Empty);
        }
        if delays.len() + 1 != durations.len() {
            return Err(TimingError::DelayCount {
                durations: durations.len(),
                delays: delays.len(),
            });
        }
        if let Some(index) = durations.iter().position(|d| *d < Time::ZERO) {
            return Err(TimingError::Negative {
                kind: "duration",
                index,
            });
        }
        if let Some(index) = delays.iter().position(|d| *d < Time::ZERO) {
            return Err(TimingError::Negative {
                kind: "delay",
                index,
            });
        }
        Ok(Self { durations, delays })
    }

    #[must_use]
    pub fn durations(&self) -> &[Time] {
        &self.durations
    }

    #[must_use]
    pub fn delays(&self) -> &[Time] {
        &self.delays
    }

    /// Number of coils the table drives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Lays out the firing windows starting at `t0`.
    #[must_use]
    pub fn windows(&self, t0: Time) -> Vec<Pulse> {
        let mut windows = Vec::with_capacity(self.durations.len());
        let mut on = t0;
        for (index, duration) in self.durations.iter().enumerate() {
            let off = on + *duration;
            windows.push(Pulse { on, off });
            if let Some(delay) = self.delays.get(index) {
                on = off + *delay;
            }
        }
        windows
    }
}

/// Time-scheduled firing from a [`TimingTable`].
///
/// Each coil is active while the clock is inside its half-open window
/// `[on, off)`, regardless of projectile position. A coil fires at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Manual {
    table: TimingTable,
    windows: Vec<Pulse>,
}

impl Manual {
    #[must_use]
    pub fn new(table: TimingTable) -> Self {
        Self {
            table,
            windows: Vec::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &TimingTable {
        &self.table
    }

    fn scheduled(&self, time: Time) -> Option<CoilId> {
        self.windows
            .iter()
            .position(|window| window.on <= time && time < window.off)
            .map(CoilId::from_index)
    }
}

impl FiringMode for Manual {
    fn validate(&self, bank: &CoilBank) -> Result<(), TimingError> {
        if self.table.len() == bank.len() {
            Ok(())
        } else {
            Err(TimingError::CoilCount {
                table: self.table.len(),
                bank: bank.len(),
            })
        }
    }

    fn initialize(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let precision = context.precision;
        self.windows = self
            .table
            .windows(context.time)
            .into_iter()
            .map(|window| Pulse {
                on: precision.round_time(window.on),
                off: precision.round_time(window.off),
            })
            .collect();
        self.update(bank, context)
    }

    fn update(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let scheduled = self.scheduled(context.time);

        let expired: Vec<_> = bank
            .coils()
            .iter()
            .filter(|coil| coil.state().is_active() && Some(coil.id()) != scheduled)
            .map(|coil| coil.id())
            .collect();
        for id in expired {
            shut_down(bank, id, context.time, &mut transitions);
        }

        if let Some(id) = scheduled {
            let unfired = bank
                .get(id)
                .is_some_and(|coil| !coil.state().is_active() && !coil.state().is_spent());
            if unfired {
                activate(bank, id, context.time, &mut transitions);
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::time::second;

    use crate::{CoilState, bank::test_support::coil_at, firing::test_support::at};

    fn seconds(value: f64) -> Time {
        Time::new::<second>(value)
    }

    fn table() -> TimingTable {
        TimingTable::new(
            vec![seconds(0.2), seconds(0.1), seconds(0.1)],
            vec![seconds(0.05), seconds(0.0)],
        )
        .unwrap()
    }

    #[test]
    fn table_shape_is_validated() {
        assert_eq!(TimingTable::new(vec![], vec![]), Err(TimingError::Empty));
        assert_eq!(
            TimingTable::new(vec![seconds(0.1), seconds(0.1)], vec![]),
            Err(TimingError::DelayCount {
                durations: 2,
                delays: 0,
            })
        );
        assert_eq!(
            TimingTable::new(vec![seconds(0.1), seconds(0.1)], vec![seconds(-0.01)]),
            Err(TimingError::Negative {
                kind: "delay",
                index: 0,
            })
        );
    }

    #[test]
    fn table_must_match_the_bank() {
        let bank = CoilBank::new([coil_at(0.1, 0.0), coil_at(0.2, 0.0)]).unwrap();
        let mode = Manual::new(table());
        assert_eq!(
            mode.validate(&bank),
            Err(TimingError::CoilCount { table: 3, bank: 2 })
        );
    }

    #[test]
    fn windows_chain_durations_and_delays() {
        let windows = table().windows(seconds(0.0));
        let bounds: Vec<_> = windows
            .iter()
            .map(|w| (w.on.get::<second>(), w.off.get::<second>()))
            .collect();

        approx::assert_relative_eq!(bounds[1].0, 0.25);
        approx::assert_relative_eq!(bounds[1].1, 0.35);
        approx::assert_relative_eq!(bounds[2].0, 0.35);
        approx::assert_relative_eq!(bounds[2].1, 0.45);
    }

    #[test]
    fn follows_the_schedule() {
        let mut bank =
            CoilBank::new([coil_at(0.1, 0.0), coil_at(0.2, 0.0), coil_at(0.3, 0.0)]).unwrap();
        let mut mode = Manual::new(table());

        mode.initialize(&mut bank, &at(0.0, 0.0));
        assert!(bank.coils()[0].state().is_active());

        // Gap between coil 1 and coil 2.
        mode.update(&mut bank, &at(0.2, 0.0));
        assert!(!bank.any_active());
        assert_eq!(
            bank.coils()[0].state(),
            CoilState::Spent {
                pulse: Some(Pulse {
                    on: seconds(0.0),
                    off: seconds(0.2),
                }),
            }
        );

        mode.update(&mut bank, &at(0.25, 0.0));
        assert!(bank.coils()[1].state().is_active());

        // Back-to-back windows hand over in one step.
        let transitions = mode.update(&mut bank, &at(0.35, 0.0));
        assert_eq!(transitions.len(), 2);
        assert!(bank.coils()[1].state().is_spent());
        assert!(bank.coils()[2].state().is_active());

        mode.update(&mut bank, &at(0.45, 0.0));
        assert!(bank.coils().iter().all(|coil| coil.state().is_spent()));
    }

    #[test]
    fn ignores_projectile_position() {
        let mut bank = CoilBank::new([coil_at(0.1, 0.0)]).unwrap();
        let table = TimingTable::new(vec![seconds(0.5)], vec![]).unwrap();
        let mut mode = Manual::new(table);

        mode.initialize(&mut bank, &at(0.0, 0.0));
        mode.update(&mut bank, &at(0.1, 5.0));
        assert!(bank.any_active());
    }
}
