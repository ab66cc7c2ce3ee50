use std::fs;

use approx::assert_relative_eq;
use coilgun_core::testing::{ScriptedBackend, ScriptedSolver};
use coilgun_launch::{PulseOutcome, launch};
use coilgun_sweep::{
    DragSpec, Environment, SweepConfig, SweepError,
    batch::{self, Status},
    record::{RunConfigRecord, RunSummary, SummaryRow, write_run_artifacts, write_table},
};
use uom::si::{f64::Force, force::newton};

/// Pulls with 50 N whenever any coil carries a winding.
fn pulling_backend() -> ScriptedBackend {
    ScriptedBackend::new(ScriptedSolver::with_force(|query| {
        if query.energized.is_empty() {
            Force::new::<newton>(0.0)
        } else {
            Force::new::<newton>(50.0)
        }
    }))
}

fn dry_sweep() -> SweepConfig {
    SweepConfig::from_toml(
        r#"
        environment = "dry"
        max_time_s = 0.5

        [parameters]
        voltage = [150.0, 165.0]
        added_mass = [0.0, 20.0, 40.0]
        drag_coefficient = [0.0]
        "#,
    )
    .unwrap()
}

fn summaries(config: &SweepConfig, report: &batch::Report) -> Vec<RunSummary> {
    report
        .runs
        .iter()
        .map(|run| RunSummary::new(run, config.environment))
        .collect()
}

#[test]
fn runs_every_combination_in_order() {
    let config = dry_sweep();
    let report = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();

    assert_eq!(report.status, Status::Completed);
    assert_eq!(report.runs.len(), 6);

    let grid: Vec<(f64, f64)> = report
        .runs
        .iter()
        .map(|run| {
            let row = SummaryRow::new(&config, run, &RunSummary::new(run, config.environment));
            (row.voltage, row.added_mass_g)
        })
        .collect();
    let expected = [
        (150.0, 0.0),
        (150.0, 20.0),
        (150.0, 40.0),
        (165.0, 0.0),
        (165.0, 20.0),
        (165.0, 40.0),
    ];
    for ((voltage, mass), (want_voltage, want_mass)) in grid.into_iter().zip(expected) {
        assert_relative_eq!(voltage, want_voltage, epsilon = 1e-9);
        assert_relative_eq!(mass, want_mass, epsilon = 1e-9);
    }
}

#[test]
fn pulled_projectile_fires_every_coil_and_exits() {
    let config = dry_sweep();
    let report = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();

    for (run, summary) in report.runs.iter().zip(summaries(&config, &report)) {
        assert_eq!(run.solution.status, launch::Status::ReachedEnd);
        assert!(run.solution.released_at.is_some());

        for coil in &summary.coils {
            assert!(matches!(coil.outcome, PulseOutcome::Completed(_)));
            assert!(coil.duration_ms.unwrap() > 0.0);
        }
        assert_eq!(summary.coils[0].delay_ms, None);
        assert!(summary.coils[1].delay_ms.unwrap() >= 0.0);

        let exit = summary.exit_velocity_in_per_s.unwrap();
        let max = summary.max_velocity_in_per_s.unwrap();
        assert!(exit > 0.0);
        assert!(exit <= max);
    }

    // Heavier payloads leave slower.
    let exits: Vec<f64> = summaries(&config, &report)
        .iter()
        .take(3)
        .map(|s| s.exit_velocity_in_per_s.unwrap())
        .collect();
    assert!(exits[0] > exits[1] && exits[1] > exits[2]);
}

#[test]
fn identical_batches_give_identical_summaries() {
    let config = dry_sweep();
    let first = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();
    let second = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();

    assert_eq!(summaries(&config, &first), summaries(&config, &second));
}

#[test]
fn stalled_projectile_reports_no_exit() {
    let config = SweepConfig {
        max_time_s: 0.05,
        ..SweepConfig::default()
    };
    let mut backend = ScriptedBackend::new(ScriptedSolver::zero_force());
    let report = batch::run_unobserved(&mut backend, &config).unwrap();

    let run = &report.runs[0];
    assert_eq!(run.solution.status, launch::Status::TimeLimit);

    let summary = RunSummary::new(run, config.environment);
    assert_eq!(summary.exit_velocity_in_per_s, None);
    assert_eq!(summary.max_velocity_in_per_s, Some(0.0));
    assert!(matches!(
        summary.coils[0].outcome,
        PulseOutcome::Truncated { .. }
    ));
    assert_eq!(summary.coils[1].outcome, PulseOutcome::NotFired);
}

#[test]
fn guard_checks_reject_the_batch() {
    let err = SweepConfig::from_toml(
        r#"
        environment = "dry"
        [parameters]
        drag_coefficient = [0.5, "actual"]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SweepError::EmpiricalDragDry));

    let mut config = dry_sweep();
    config.parameters.drag_coefficient.push(DragSpec::Coefficient(1.0));
    config.environment = Environment::Submerged;
    assert!(config.check().is_ok());
}

#[test]
fn table_has_a_header_and_one_line_per_run() {
    let config = dry_sweep();
    let report = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();
    let rows: Vec<SummaryRow> = report
        .runs
        .iter()
        .map(|run| SummaryRow::new(&config, run, &RunSummary::new(run, config.environment)))
        .collect();

    let mut out = Vec::new();
    write_table(&mut out, &rows).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 7);
    for line in &lines {
        assert_eq!(line.split(',').count(), 16);
    }
    assert!(lines[1].starts_with("actual,Dry,150,actual,0,0,0,2,1,"));
}

#[test]
fn run_artifacts_are_written_as_json() {
    let config = dry_sweep();
    let report = batch::run_unobserved(&mut pulling_backend(), &config).unwrap();
    let run = &report.runs[4];

    let dir = std::env::temp_dir().join(format!("coilgun-sweep-{}", std::process::id()));
    let run_dir = write_run_artifacts(
        &dir,
        &RunConfigRecord::new(&config, run),
        &RunSummary::new(run, config.environment),
    )
    .unwrap();
    assert!(run_dir.ends_with("run-0004"));

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("config.json")).unwrap()).unwrap();
    assert_eq!(record["index"], 4);
    assert_eq!(record["model"], "Models/ThreeCoilModelAxi_actual.fem");
    assert_eq!(record["environment"], "dry");

    let output: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("output.json")).unwrap()).unwrap();
    assert_eq!(output["coils"].as_array().unwrap().len(), 3);
    assert!(output["exit_velocity_in_per_s"].is_number());

    fs::remove_dir_all(dir).unwrap();
}
