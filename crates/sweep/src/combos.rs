use serde::Serialize;
use uom::si::{
    electric_potential::volt,
    f64::{ElectricPotential, Length, Mass},
    length::inch,
    mass::gram,
};

use crate::{DragSpec, Parameters, TurnsSpec};

const AXES: usize = 7;

/// One point of the parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Combination {
    /// Zero-based position in the batch.
    pub index: usize,

    pub voltage: ElectricPotential,
    pub turns: TurnsSpec,

    /// Distance of the projectile tip from the start of coil 1.
    pub starting_position: Length,

    pub coil_2_threshold: Length,
    pub coil_3_threshold: Length,
    pub added_mass: Mass,
    pub drag: DragSpec,
}

/// Iterator over the Cartesian product of a [`Parameters`] grid.
///
/// Works like an odometer: the drag coefficient turns over fastest and the
/// voltage slowest.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    parameters: &'a Parameters,
    digits: [usize; AXES],
    next: usize,
    total: usize,
}

impl<'a> Combinations<'a> {
    pub(crate) fn new(parameters: &'a Parameters) -> Self {
        let total = parameters.axes().iter().map(|(_, len)| len).product();
        Self {
            parameters,
            digits: [0; AXES],
            next: 0,
            total,
        }
    }

    fn current(&self) -> Combination {
        let p = self.parameters;
        let [v, t, s, c2, c3, m, d] = self.digits;
        Combination {
            index: self.next,
            voltage: ElectricPotential::new::<volt>(p.voltage[v]),
            turns: p.turns[t],
            starting_position: Length::new::<inch>(p.starting_position[s]),
            coil_2_threshold: Length::new::<inch>(p.coil_2_threshold[c2]),
            coil_3_threshold: Length::new::<inch>(p.coil_3_threshold[c3]),
            added_mass: Mass::new::<gram>(p.added_mass[m]),
            drag: p.drag_coefficient[d],
        }
    }

    fn turn_over(&mut self) {
        let lengths = self.parameters.axes().map(|(_, len)| len);
        for axis in (0..AXES).rev() {
            self.digits[axis] += 1;
            if self.digits[axis] < lengths[axis] {
                return;
            }
            self.digits[axis] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        if self.next >= self.total {
            return None;
        }
        let combination = self.current();
        self.next += 1;
        self.turn_over();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}
