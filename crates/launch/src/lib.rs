//! Per-step coilgun launch kernel.
//!
//! A launch couples four pieces each timestep:
//!
//! - a [`CoilBank`] whose [`FiringMode`] decides which coil is energized,
//! - a [`DischargeCircuit`] giving the capacitor current through that coil,
//! - a [`ForceSolver`](coilgun_core::ForceSolver) queried for the magnetic
//!   force, combined with [`Drag`] and [`Friction`] into a [`ForceBreakdown`],
//! - the [`kinematics`] update that moves the projectile and the solver body.
//!
//! [`launch::simulate`] runs the loop against an open solver and
//! [`launch::run`] wraps it in a scoped session. Exit velocity and pulse
//! timing are extracted from the resulting [`launch::Solution`].

mod bank;
mod clock;
mod coil;
mod config;
mod discharge;
mod extract;
mod firing;
mod forces;
pub mod kinematics;
pub mod launch;
mod precision;
mod projectile;
mod telemetry;

pub use bank::{BankError, CoilBank};
pub use clock::SimulationClock;
pub use coil::{Coil, CoilId, CoilResistance, CoilSpec, CoilState, Pulse};
pub use config::{ConfigError, LaunchConfig, Timing};
pub use discharge::{CircuitError, DischargeCircuit};
pub use extract::{
    ExitError, PulseOutcome, PulseReport, exit_sample, exit_velocity, pulse_reports,
};
pub use firing::{
    Firing, FiringContext, FiringMode, Manual, Sequential, SequentialCutoff, TimingError,
    TimingTable, Transition,
};
pub use forces::{Drag, DragLaw, EmpiricalDrag, ForceBreakdown, Friction};
pub use kinematics::Motion;
pub use precision::Precision;
pub use projectile::{BodyProperties, Projectile, ProjectileSpec};
pub use telemetry::{Sample, TelemetrySeries};
