use thiserror::Error;
use uom::si::f64::Length;

use crate::{Coil, CoilId, CoilSpec, CoilState};

/// Errors that can occur when building a [`CoilBank`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BankError {
    #[error("a coil bank needs at least one coil")]
    Empty,

    #[error("coil centers must strictly increase along the barrel ({previous} is not behind {next})")]
    Unordered { previous: CoilId, next: CoilId },
}

/// The ordered set of drive coils for one run.
///
/// Coils are stored breech to muzzle; ordinals follow storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoilBank {
    coils: Vec<Coil>,
}

impl CoilBank {
    /// Builds a bank with every coil [`Pending`](CoilState::Pending).
    ///
    /// # Errors
    ///
    /// Returns a [`BankError`] if there are no coils or the centers do not
    /// strictly increase.
    pub fn new<I>(specs: I) -> Result<Self, BankError>
    where
        I: IntoIterator<Item = CoilSpec>,
    {
        let coils: Vec<_> = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Coil::new(CoilId::from_index(index), spec))
            .collect();

        if coils.is_empty() {
            return Err(BankError::Empty);
        }

        if let Some(pair) = coils
            .windows(2)
            .find(|pair| pair[0].center() >= pair[1].center())
        {
            return Err(BankError::Unordered {
                previous: pair[0].id(),
                next: pair[1].id(),
            });
        }

        Ok(Self { coils })
    }

    #[must_use]
    pub fn coils(&self) -> &[Coil] {
        &self.coils
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coils.len()
    }

    /// Always `false`; a bank is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coils.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CoilId) -> Option<&Coil> {
        self.coils.get(id.index())
    }

    /// The coil that currently leads the firing sequence.
    ///
    /// This is the highest-ordinal coil that has left [`CoilState::Pending`].
    #[must_use]
    pub fn current(&self) -> Option<CoilId> {
        self.coils
            .iter()
            .rev()
            .find(|coil| !coil.state().is_pending())
            .map(Coil::id)
    }

    /// The coil whose capacitor bank feeds the drive circuit.
    ///
    /// When several coils are active at once only the highest-ordinal one is
    /// considered the source.
    #[must_use]
    pub fn energized(&self) -> Option<&Coil> {
        self.coils.iter().rev().find(|coil| coil.state().is_active())
    }

    #[must_use]
    pub fn any_active(&self) -> bool {
        self.coils.iter().any(|coil| coil.state().is_active())
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.coils
            .iter()
            .filter(|coil| coil.state().is_active())
            .count()
    }

    /// Center of the muzzle-most coil.
    #[must_use]
    pub fn last_center(&self) -> Length {
        self.coils
            .last()
            .map(Coil::center)
            .unwrap_or_else(|| unreachable!("a bank is never empty"))
    }

    pub(crate) fn set_state(&mut self, id: CoilId, state: CoilState) {
        if let Some(coil) = self.coils.get_mut(id.index()) {
            coil.set_state(state);
        }
    }
}
