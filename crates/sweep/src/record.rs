//! Run records and the batch summary table.
//!
//! Records use the rig's working units: volts, inches, grams, milliseconds,
//! and inches per second.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use coilgun_core::ModelRef;
use coilgun_launch::{LaunchConfig, PulseOutcome};
use serde::Serialize;
use thiserror::Error;
use uom::si::{
    electric_potential::volt,
    f64::{Time, Velocity},
    length::inch,
    mass::gram,
    time::millisecond,
    velocity::inch_per_second,
};

use crate::{
    Combination, DragSpec, Environment, FiringSelection, ModelVariant, SweepConfig, TurnsSpec,
    batch::Run, rig,
};

/// Errors that can occur while writing run artifacts.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn ms(time: Time) -> f64 {
    time.get::<millisecond>()
}

fn in_per_s(velocity: Velocity) -> f64 {
    velocity.get::<inch_per_second>()
}

/// Everything needed to reproduce one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfigRecord {
    pub index: usize,
    pub model: ModelRef,
    pub variant: ModelVariant,
    pub environment: Environment,
    pub firing: FiringSelection,
    pub body_loaded: bool,
    pub payload_release: bool,
    pub combination: Combination,
    pub launch: LaunchConfig,
}

impl RunConfigRecord {
    #[must_use]
    pub fn new(config: &SweepConfig, run: &Run) -> Self {
        Self {
            index: run.combination.index,
            model: rig::model(config),
            variant: config.model,
            environment: config.environment,
            firing: config.firing.clone(),
            body_loaded: config.body_loaded,
            payload_release: config.payload_release,
            combination: run.combination,
            launch: run.config.clone(),
        }
    }
}

/// Pulse timing of one coil, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoilSummary {
    /// One-based coil number.
    pub coil: usize,
    pub outcome: PulseOutcome,
    pub power_on_ms: Option<f64>,
    pub shutdown_ms: Option<f64>,
    pub duration_ms: Option<f64>,

    /// Gap since the previous coil shut down.
    pub delay_ms: Option<f64>,
}

/// The outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub index: usize,
    pub max_velocity_in_per_s: Option<f64>,

    /// `None` when the projectile never passed the exit threshold.
    pub exit_velocity_in_per_s: Option<f64>,

    pub coils: Vec<CoilSummary>,
}

impl RunSummary {
    /// Summarizes a run, taking the exit velocity at the environment's exit threshold.
    #[must_use]
    pub fn new(run: &Run, environment: Environment) -> Self {
        let solution = &run.solution;
        let coils = solution
            .pulses()
            .into_iter()
            .map(|report| CoilSummary {
                coil: report.coil.ordinal(),
                outcome: report.outcome,
                power_on_ms: report.outcome.power_on().map(ms),
                shutdown_ms: report.outcome.shutdown().map(ms),
                duration_ms: report.duration.map(ms),
                delay_ms: report.delay.map(ms),
            })
            .collect();

        Self {
            index: run.combination.index,
            max_velocity_in_per_s: solution.max_velocity().map(in_per_s),
            exit_velocity_in_per_s: solution
                .exit_velocity(environment.exit_threshold())
                .ok()
                .map(in_per_s),
            coils,
        }
    }
}

/// One line of the batch table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub variant: ModelVariant,
    pub environment: Environment,
    pub voltage: f64,
    pub turns: TurnsSpec,
    pub added_mass_g: f64,
    pub drag: DragSpec,
    pub starting_position_in: f64,

    /// Activation thresholds of coils 2 onward, in inches.
    pub thresholds_in: Vec<f64>,

    pub durations_ms: Vec<Option<f64>>,
    pub delays_ms: Vec<Option<f64>>,
    pub max_velocity: Option<f64>,
    pub exit_velocity: Option<f64>,
}

impl SummaryRow {
    #[must_use]
    pub fn new(config: &SweepConfig, run: &Run, summary: &RunSummary) -> Self {
        let combination = &run.combination;
        Self {
            variant: config.model,
            environment: config.environment,
            voltage: combination.voltage.get::<volt>(),
            turns: combination.turns,
            added_mass_g: combination.added_mass.get::<gram>(),
            drag: combination.drag,
            starting_position_in: combination.starting_position.get::<inch>(),
            thresholds_in: run
                .config
                .coils
                .iter()
                .skip(1)
                .map(|coil| coil.threshold.get::<inch>())
                .collect(),
            durations_ms: summary.coils.iter().map(|c| c.duration_ms).collect(),
            delays_ms: summary.coils.iter().skip(1).map(|c| c.delay_ms).collect(),
            max_velocity: summary.max_velocity_in_per_s,
            exit_velocity: summary.exit_velocity_in_per_s,
        }
    }

    /// Column names for a bank of `coils` coils.
    #[must_use]
    pub fn header(coils: usize) -> Vec<String> {
        let mut header: Vec<String> = [
            "Model Type",
            "Test Type",
            "Voltage",
            "Turns",
            "Added Mass",
            "Drag Coefficient",
            "Starting Distance of Tip From Coil 1",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        header.extend((2..=coils).map(|k| format!("Coil {k} Distance Threshold")));
        header.extend((1..=coils).map(|k| format!("Coil {k} Duration")));
        header.extend((2..=coils).map(|k| format!("Coil {}-{k} Delay", k - 1)));
        header.push("Max Velocity".to_string());
        header.push("Exit Velocity".to_string());
        header
    }

    /// The row's fields in [`SummaryRow::header`] order. Missing values are empty.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let optional = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

        let mut fields = vec![
            self.variant.to_string(),
            self.environment.to_string(),
            self.voltage.to_string(),
            self.turns.to_string(),
            self.added_mass_g.to_string(),
            self.drag.to_string(),
            self.starting_position_in.to_string(),
        ];
        fields.extend(self.thresholds_in.iter().map(f64::to_string));
        fields.extend(self.durations_ms.iter().copied().map(optional));
        fields.extend(self.delays_ms.iter().copied().map(optional));
        fields.push(optional(self.max_velocity));
        fields.push(optional(self.exit_velocity));
        fields
    }
}

/// Writes a header and one record per row as CSV.
///
/// # Errors
///
/// Returns a [`RecordError`] if a record cannot be written to `writer`.
pub fn write_table<W: Write>(writer: W, rows: &[SummaryRow]) -> Result<(), RecordError> {
    let coils = rows.first().map_or(rig::COILS, |row| row.durations_ms.len());
    let mut table = csv::Writer::from_writer(writer);
    table.write_record(SummaryRow::header(coils))?;
    for row in rows {
        table.write_record(row.fields())?;
    }
    table.flush()?;
    Ok(())
}

/// Writes `config.json` and `output.json` for one run into `dir/run-NNNN`.
///
/// Returns the run directory.
///
/// # Errors
///
/// Returns a [`RecordError`] if the directory or files cannot be written.
pub fn write_run_artifacts(
    dir: &Path,
    config: &RunConfigRecord,
    summary: &RunSummary,
) -> Result<PathBuf, RecordError> {
    let run_dir = dir.join(format!("run-{:04}", config.index));
    fs::create_dir_all(&run_dir)?;
    fs::write(run_dir.join("config.json"), serde_json::to_string_pretty(config)?)?;
    fs::write(run_dir.join("output.json"), serde_json::to_string_pretty(summary)?)?;
    Ok(run_dir)
}
