use super::{FiringContext, FiringMode, Transition, activate, shut_down};
use crate::CoilBank;

/// Every coil energizes at the start and cuts off once the projectile center
/// reaches it.
///
/// Spent coils never re-arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequentialCutoff;

impl FiringMode for SequentialCutoff {
    fn initialize(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let mut transitions = Vec::with_capacity(bank.len());
        let ids: Vec<_> = bank.coils().iter().map(|coil| coil.id()).collect();
        for id in ids {
            activate(bank, id, context.time, &mut transitions);
        }
        transitions
    }

    fn update(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let passed: Vec<_> = bank
            .coils()
            .iter()
            .filter(|coil| coil.state().is_active() && context.position >= coil.center())
            .map(|coil| coil.id())
            .collect();
        for id in passed {
            shut_down(bank, id, context.time, &mut transitions);
        }
        transitions
    }
}
