use coilgun_core::Observer;
use uom::si::f64::Time;

use crate::traits::{CanStopEarly, HasRunIndex, HasTime};

/// Stops a run once an event reaches a simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopAtTime {
    pub limit: Time,
}

impl StopAtTime {
    #[must_use]
    pub fn new(limit: Time) -> Self {
        Self { limit }
    }
}

impl<E: HasTime, A: CanStopEarly> Observer<E, A> for StopAtTime {
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.time() >= self.limit).then(A::stop_early)
    }
}

/// Stops a batch after a number of runs.
///
/// The stop is requested by the first event of the run past the limit, before
/// that run opens a solver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAfterRuns {
    pub runs: usize,
}

impl StopAfterRuns {
    #[must_use]
    pub fn new(runs: usize) -> Self {
        Self { runs }
    }
}

impl<E: HasRunIndex, A: CanStopEarly> Observer<E, A> for StopAfterRuns {
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.run_index() >= self.runs).then(A::stop_early)
    }
}
