//! Reusable observers for coilgun launches and sweeps.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with both the launch kernel and the batch runner.
//!
//! # Modules
//!
//! - [`traits`]: capability traits for event and action types
//!   ([`HasTime`], [`HasRunIndex`], [`CanStopEarly`])
//! - [`log`]: [`EventLog`], a line-per-event text log
//! - [`stop`]: [`StopAtTime`] and [`StopAfterRuns`]
//!
//! [`Observer`]: coilgun_core::Observer
//! [`HasTime`]: traits::HasTime
//! [`HasRunIndex`]: traits::HasRunIndex
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod log;
pub mod stop;
pub mod traits;

pub use log::EventLog;
pub use stop::{StopAfterRuns, StopAtTime};
