//! Runs a small voltage sweep against an analytic stand-in for the field solver
//! and prints the summary table.
//!
//! ```sh
//! cargo run -p coilgun-sweep --example batch
//! ```

use std::{error::Error as StdError, io};

use coilgun_core::{ForceSolver, GroupId, LabelPosition, ModelRef, SolverBackend, Winding};
use coilgun_sweep::{
    SweepConfig,
    batch::{self, Event},
    record::{RunSummary, SummaryRow, write_table},
};
use thiserror::Error;
use uom::{
    ConstZero,
    si::{
        electric_current::ampere,
        electric_potential::volt,
        f64::{ElectricCurrent, Force, Length},
        force::newton,
        length::{inch, meter},
    },
};

const SWEEP: &str = r#"
model = "actual"
environment = "dry"
max_time_s = 0.2

[parameters]
voltage = [100.0, 150.0, 200.0]
turns = [200]
drag_coefficient = [0.8]
"#;

#[derive(Debug, Error)]
enum AxialError {
    #[error("force requested before the model was solved")]
    NotSolved,
}

/// Treats each energized coil as a current loop pulling the slug toward its
/// center with an on-axis dipole profile.
#[derive(Debug)]
struct AxialSolver {
    slug: Length,
    current: ElectricCurrent,
    windings: Vec<(Length, u32)>,
    solved: bool,
}

impl AxialSolver {
    /// Scales ampere-turns times the profile to newtons.
    const GAIN: f64 = 3.3e-4;

    /// Effective coil radius in the force profile, in metres.
    const RADIUS: f64 = 0.02;

    fn profile(distance: f64) -> f64 {
        let a = Self::RADIUS;
        -distance * a / (distance * distance + a * a).powf(1.5)
    }
}

impl ForceSolver for AxialSolver {
    type Error = AxialError;

    fn load_geometry(&mut self, _model: &ModelRef) -> Result<(), Self::Error> {
        Ok(())
    }

    fn select_body(&mut self, _group: GroupId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_coil_winding(
        &mut self,
        label: LabelPosition,
        winding: Winding<'_>,
    ) -> Result<(), Self::Error> {
        self.windings.retain(|(center, _)| *center != label.axial);
        if let Winding::Energized { turns, .. } = winding {
            self.windings.push((label.axial, turns));
        }
        self.solved = false;
        Ok(())
    }

    fn translate_body(&mut self, _group: GroupId, delta: Length) -> Result<(), Self::Error> {
        self.slug += delta;
        self.solved = false;
        Ok(())
    }

    fn set_circuit_current(
        &mut self,
        _circuit: &str,
        current: ElectricCurrent,
    ) -> Result<(), Self::Error> {
        self.current = current;
        self.solved = false;
        Ok(())
    }

    fn solve_and_load(&mut self) -> Result<(), Self::Error> {
        self.solved = true;
        Ok(())
    }

    fn integrate_force(&mut self, _group: GroupId) -> Result<Force, Self::Error> {
        if !self.solved {
            return Err(AxialError::NotSolved);
        }
        let amps = self.current.get::<ampere>();
        let newtons: f64 = self
            .windings
            .iter()
            .map(|(center, turns)| {
                let distance = (self.slug - *center).get::<meter>();
                Self::GAIN * f64::from(*turns) * amps * Self::profile(distance)
            })
            .sum();
        Ok(Force::new::<newton>(newtons))
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Opens solvers with the slug drawn at the start of coil 1.
struct AxialBackend {
    slug_origin: Length,
}

impl SolverBackend for AxialBackend {
    type Solver = AxialSolver;
    type Error = AxialError;

    fn open_session(&mut self) -> Result<AxialSolver, AxialError> {
        Ok(AxialSolver {
            slug: self.slug_origin,
            current: ElectricCurrent::ZERO,
            windings: Vec::new(),
            solved: false,
        })
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    let config = SweepConfig::from_toml(SWEEP)?;
    let mut backend = AxialBackend {
        slug_origin: Length::new::<inch>(1.0),
    };

    let report = batch::run(&mut backend, &config, |event: &Event| -> Option<batch::Action> {
        match event {
            Event::Started { combination } => {
                let volts = combination.voltage.get::<volt>();
                eprintln!("run {} at {volts} V", combination.index);
            }
            Event::Finished { index, status } => eprintln!("run {index} finished: {status:?}"),
            Event::Launch { .. } => {}
        }
        None
    })?;

    let rows: Vec<SummaryRow> = report
        .runs
        .iter()
        .map(|run| SummaryRow::new(&config, run, &RunSummary::new(run, config.environment)))
        .collect();
    write_table(&mut io::stdout(), &rows)?;

    Ok(())
}
