//! The launch stepper.
//!
//! Each step runs in a fixed order:
//!
//! 1. Update coil firing states and mirror the changes onto the solver.
//! 2. Release the payload if the projectile has reached the last coil.
//! 3. Compute the discharge current and push it to the solver circuit.
//! 4. If any coil is active, solve and integrate the magnetic force.
//! 5. Combine magnetic force, drag, and friction into a net force.
//! 6. Record the start-of-step state.
//! 7. Integrate position and velocity, and move the solver body to match.
//! 8. Advance the clock and emit [`Event::Step`].
//!
//! The run ends when the projectile reaches the end position, the clock
//! reaches the maximum time, or an observer returns [`Action::StopEarly`].
//!
//! # Example
//!
//! ```ignore
//! use coilgun_launch::{Firing, launch};
//!
//! let solution = launch::run(&mut backend, &model, &config, Firing::sequential(), ())?;
//! let exit = solution.exit_velocity(threshold)?;
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use coilgun_core::{ForceSolver, ModelRef, Observer, Session, SolverBackend, Winding};
use uom::{
    ConstZero,
    si::f64::{ElectricCurrent, Force},
};

use crate::{
    CoilBank, ConfigError, FiringContext, FiringMode, ForceBreakdown, LaunchConfig, Precision,
    Projectile, Sample, SimulationClock, TelemetrySeries, Transition, kinematics,
};

/// Simulates one launch against an open solver.
///
/// The solver must already have the model geometry loaded. The projectile
/// body is first moved from its model position to the configured start.
///
/// # Observer
///
/// The observer receives every [`Event`] and may return
/// [`Action::StopEarly`] to end the launch with the samples recorded so far.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configuration or firing mode is invalid,
/// or [`Error::Solver`] as soon as any solver call fails.
pub fn simulate<S, F, Obs>(
    solver: &mut S,
    config: &LaunchConfig,
    mut firing: F,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    S: ForceSolver,
    F: FiringMode,
    Obs: Observer<Event, Action>,
{
    let mut bank = prepare(config, &firing)?;
    let mut projectile = Projectile::new(&config.projectile);
    let mut clock = SimulationClock::new(config.timing.dt, config.timing.max_time);
    let mut telemetry = TelemetrySeries::new();

    let precision = clock.precision();
    let group = projectile.group();
    let circuit = config.circuit_name.as_str();
    let release_point = bank.last_center();

    // Place the body at the start position.
    solver
        .select_body(group)
        .map_err(Error::solver("select_body"))?;
    solver
        .translate_body(group, config.projectile.start - config.projectile.geometry_origin)
        .map_err(Error::solver("translate_body"))?;

    let transitions = firing.initialize(&mut bank, &context(&clock, &projectile, precision));
    let stopped = apply(solver, &bank, &transitions, circuit, &clock, &mut observer)?;

    let mut steps = 0;
    let mut released_at = None;

    let status = loop {
        if stopped {
            break Status::StoppedByObserver;
        }
        if projectile.position() >= config.end_position {
            break Status::ReachedEnd;
        }
        if clock.expired() {
            break Status::TimeLimit;
        }

        let time = clock.time();

        // Firing.
        let transitions = firing.update(&mut bank, &context(&clock, &projectile, precision));
        if transitions.iter().any(Transition::is_activation) {
            clock.reset_activation();
        }
        if apply(solver, &bank, &transitions, circuit, &clock, &mut observer)? {
            break Status::StoppedByObserver;
        }

        // Payload release.
        if projectile.release_at(release_point) {
            released_at = Some(time);
            let event = Event::PayloadReleased {
                time,
                position: projectile.position(),
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                break Status::StoppedByObserver;
            }
        }

        // Discharge current.
        let current = bank.energized().map_or(ElectricCurrent::ZERO, |coil| {
            precision.round_current(config.circuit.current(
                coil.spec().voltage,
                coil.resistance(),
                clock.since_activation(),
            ))
        });
        solver
            .set_circuit_current(circuit, current)
            .map_err(Error::solver("set_circuit_current"))?;

        // Magnetic force.
        let magnetic = if bank.any_active() {
            solver
                .solve_and_load()
                .map_err(Error::solver("solve_and_load"))?;
            solver
                .select_body(group)
                .map_err(Error::solver("select_body"))?;
            solver
                .integrate_force(group)
                .map_err(Error::solver("integrate_force"))?
        } else {
            Force::ZERO
        };

        let body = projectile.body();
        let velocity = projectile.velocity();
        let forces = ForceBreakdown::new(
            magnetic,
            config.drag.force(velocity, &body, projectile.released()),
            config.friction.force(velocity, body.mass),
        );

        let sample = Sample {
            time,
            position: projectile.position(),
            velocity,
            coil_force: magnetic,
            drag_force: forces.drag,
            current,
        };
        telemetry.push(sample);

        // Kinematics.
        let motion = kinematics::integrate(
            projectile.position(),
            velocity,
            kinematics::acceleration(forces.net, body.mass),
            clock.dt(),
        );
        projectile.apply(motion);
        solver
            .select_body(group)
            .map_err(Error::solver("select_body"))?;
        solver
            .translate_body(group, motion.displacement)
            .map_err(Error::solver("translate_body"))?;

        clock.advance();
        steps += 1;

        let event = Event::Step {
            step: steps,
            sample,
            forces,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            break Status::StoppedByObserver;
        }
    };

    Ok(Solution {
        status,
        telemetry,
        coils: bank.coils().to_vec(),
        released_at,
        steps,
        precision,
    })
}

/// Runs [`simulate`] without observation.
///
/// # Errors
///
/// See [`simulate`].
pub fn simulate_unobserved<S, F>(
    solver: &mut S,
    config: &LaunchConfig,
    firing: F,
) -> Result<Solution, Error>
where
    S: ForceSolver,
    F: FiringMode,
{
    simulate(solver, config, firing, ())
}

/// Opens a session, loads `model`, simulates one launch, and closes the session.
///
/// The configuration is validated before any session is opened. The session
/// is closed on every path, including solver failures.
///
/// # Errors
///
/// Returns [`Error::Config`] for invalid configuration, [`Error::Session`] if
/// the session cannot be opened, loaded, or closed, and [`Error::Solver`] if a
/// solver call fails mid-run.
pub fn run<B, F, Obs>(
    backend: &mut B,
    model: &ModelRef,
    config: &LaunchConfig,
    firing: F,
    observer: Obs,
) -> Result<Solution, Error>
where
    B: SolverBackend,
    F: FiringMode,
    Obs: Observer<Event, Action>,
{
    prepare(config, &firing)?;

    let mut session = Session::open(backend, model)?;
    let solution = simulate(&mut *session, config, firing, observer)?;
    session.close()?;

    Ok(solution)
}

fn prepare<F: FiringMode>(config: &LaunchConfig, firing: &F) -> Result<CoilBank, Error> {
    let bank = config.bank()?;
    firing.validate(&bank).map_err(ConfigError::from)?;
    Ok(bank)
}

fn context(clock: &SimulationClock, projectile: &Projectile, precision: Precision) -> FiringContext {
    FiringContext {
        time: clock.time(),
        position: projectile.position(),
        half_length: projectile.half_length(),
        precision,
    }
}

/// Mirrors coil transitions onto the solver windings and reports them.
///
/// Returns `true` if the observer asked to stop.
fn apply<S, Obs>(
    solver: &mut S,
    bank: &CoilBank,
    transitions: &[Transition],
    circuit: &str,
    clock: &SimulationClock,
    observer: &mut Obs,
) -> Result<bool, Error>
where
    S: ForceSolver,
    Obs: Observer<Event, Action>,
{
    let mut stop = false;
    for transition in transitions {
        let Some(coil) = bank.get(transition.coil()) else {
            continue;
        };

        let winding = match transition {
            Transition::Armed(_) => None,
            Transition::Activated { .. } => Some(Winding::Energized {
                turns: coil.spec().turns,
                circuit,
            }),
            Transition::ShutDown { .. } | Transition::Discarded(_) => Some(Winding::Off),
        };
        if let Some(winding) = winding {
            solver
                .set_coil_winding(coil.spec().label, winding)
                .map_err(Error::solver("set_coil_winding"))?;
        }

        let event = Event::Transition {
            time: clock.time(),
            transition: *transition,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            stop = true;
        }
    }
    Ok(stop)
}
