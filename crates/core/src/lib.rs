//! Core traits and types for coilgun launch simulation.
//!
//! This crate defines the shared abstractions that the launch kernel, the
//! batch runner, and observers build on:
//!
//! - [`Observer`]: receives simulation events and optionally returns control actions
//! - [`ForceSolver`]: the blocking magnetostatic solver the kernel drives each step
//! - [`SolverBackend`]: opens fresh, exclusively owned solver sessions
//! - [`Session`]: a scoped session handle that is always closed

mod observer;
mod session;
mod solver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use observer::Observer;
pub use session::{Session, SessionError};
pub use solver::{ForceSolver, GroupId, LabelPosition, ModelRef, SolverBackend, Winding};
