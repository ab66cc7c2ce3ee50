//! Parameter sweeps over the three-coil launch rig.
//!
//! A [`SweepConfig`] (usually read from TOML) lists the values to try for
//! each parameter. [`batch::run`] simulates every combination against a fresh
//! solver session and returns a [`batch::Report`], which the [`record`]
//! module turns into JSON run records and a comma-separated summary table.
//!
//! ```ignore
//! use coilgun_sweep::{SweepConfig, batch, record::{RunSummary, SummaryRow, write_table}};
//!
//! let config = SweepConfig::from_toml(&std::fs::read_to_string("sweep.toml")?)?;
//! let report = batch::run_unobserved(&mut backend, &config)?;
//! let rows: Vec<_> = report
//!     .runs
//!     .iter()
//!     .map(|run| SummaryRow::new(&config, run, &RunSummary::new(run, config.environment)))
//!     .collect();
//! write_table(&mut std::io::stdout(), &rows)?;
//! ```

pub mod batch;
mod combos;
mod config;
mod error;
pub mod record;
pub mod rig;

pub use combos::{Combination, Combinations};
pub use config::{
    DragSpec, Environment, FiringSelection, ModelVariant, Parameters, Preset, SweepConfig,
    TurnsSpec,
};
pub use error::{BatchError, SweepError};
