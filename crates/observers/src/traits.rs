//! Capability traits for reusable observers.
//!
//! These traits abstract over the launch kernel's and the batch runner's
//! event and action types, so one observer can drive either.
//!
//! # Event traits
//!
//! - [`HasTime`]: events stamped with a simulation time
//! - [`HasRunIndex`]: events that belong to one run of a batch
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use coilgun_core::Observer;
//! use coilgun_observers::traits::{CanStopEarly, HasTime};
//! use uom::si::f64::Time;
//!
//! struct StopAfter(Time);
//!
//! impl<E: HasTime, A: CanStopEarly> Observer<E, A> for StopAfter {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.time() > self.0).then(A::stop_early)
//!     }
//! }
//! ```

use coilgun_launch::launch;
use coilgun_sweep::batch;
use uom::si::f64::Time;

/// An event stamped with a simulation time.
pub trait HasTime {
    fn time(&self) -> Time;
}

/// An event that belongs to one run of a batch.
pub trait HasRunIndex {
    /// Zero-based index of the run.
    fn run_index(&self) -> usize;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

impl HasTime for launch::Event {
    fn time(&self) -> Time {
        launch::Event::time(self)
    }
}

impl HasRunIndex for batch::Event {
    fn run_index(&self) -> usize {
        self.index()
    }
}

impl CanStopEarly for launch::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for batch::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
