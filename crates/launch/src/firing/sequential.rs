use super::{FiringContext, FiringMode, Transition, activate, arm, discard, shut_down};
use crate::{CoilBank, CoilId, CoilState};

/// Position-triggered firing, one coil at a time.
///
/// Coil 1 energizes at the start of the run. Each following coil arms once
/// its predecessor shuts down and energizes when the projectile's leading
/// edge comes within its threshold distance. A coil shuts down as soon as the
/// projectile center reaches the coil center.
///
/// A coil whose center the projectile has already passed when it becomes
/// current never arms, and the sequence stops there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sequential;

impl FiringMode for Sequential {
    fn initialize(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let mut transitions = Vec::new();
        activate(bank, CoilId::from_index(0), context.time, &mut transitions);
        transitions
    }

    fn update(&mut self, bank: &mut CoilBank, context: &FiringContext) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let position = context.position;

        let mut cursor = bank.current();
        while let Some(id) = cursor.take() {
            let Some(coil) = bank.get(id) else {
                break;
            };
            let (state, center, threshold) = (coil.state(), coil.center(), coil.threshold());

            match state {
                CoilState::Active { .. } if position >= center => {
                    shut_down(bank, id, context.time, &mut transitions);
                    if id.next().index() < bank.len() {
                        cursor = Some(id.next());
                    }
                }
                CoilState::Pending | CoilState::CurrentUnarmed if position < center => {
                    if state.is_pending() {
                        arm(bank, id, &mut transitions);
                    }
                    if context.leading_edge() >= center - threshold {
                        activate(bank, id, context.time, &mut transitions);
                    }
                }
                _ => {}
            }
        }

        let current = bank.current();
        let stray: Vec<_> = bank
            .coils()
            .iter()
            .filter(|coil| coil.state().is_active() && Some(coil.id()) != current)
            .map(|coil| coil.id())
            .collect();
        for id in stray {
            discard(bank, id, &mut transitions);
        }

        transitions
    }
}
