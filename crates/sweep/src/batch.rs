//! Runs every combination of a sweep, one solver session per run.
//!
//! The whole batch is checked before the first session opens, so a guard
//! failure never leaves a partial set of results. Runs execute in
//! [`SweepConfig::combinations`] order and each one closes its session before
//! the next opens.

use coilgun_core::{Observer, Session, SolverBackend};
use coilgun_launch::launch::Solution;
use coilgun_launch::{LaunchConfig, launch};

use crate::{BatchError, Combination, SweepConfig, rig};

/// Event emitted by the batch runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A run is about to open its session.
    Started { combination: Combination },

    /// Forwarded from the launch kernel.
    Launch { index: usize, event: launch::Event },

    /// A run completed and its session closed.
    Finished { index: usize, status: launch::Status },
}

impl Event {
    /// Zero-based index of the run the event belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Started { combination } => combination.index,
            Self::Launch { index, .. } | Self::Finished { index, .. } => *index,
        }
    }
}

/// Control actions an observer can request during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Finish the current run early and skip the rest.
    StopEarly,
}

/// Indicates how a batch terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every combination ran.
    Completed,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// One completed launch.
#[derive(Debug, Clone)]
pub struct Run {
    pub combination: Combination,

    /// The kernel configuration the run used.
    pub config: LaunchConfig,

    pub solution: Solution,
}

/// The result of a batch.
#[derive(Debug, Clone)]
pub struct Report {
    pub status: Status,

    /// Completed runs in combination order.
    pub runs: Vec<Run>,
}

/// Runs every combination in `config`.
///
/// # Observer
///
/// The observer sees every [`Event`], including the kernel's events wrapped
/// in [`Event::Launch`]. Returning [`Action::StopEarly`] during a launch ends
/// that launch with the samples recorded so far, keeps it in the report, and
/// skips the remaining combinations.
///
/// # Errors
///
/// Returns [`BatchError::Sweep`] if the configuration fails its checks, in
/// which case no session is opened. Otherwise returns the first session or
/// launch failure, tagged with the index of the failing run.
pub fn run<B, Obs>(
    backend: &mut B,
    config: &SweepConfig,
    mut observer: Obs,
) -> Result<Report, BatchError>
where
    B: SolverBackend,
    Obs: Observer<Event, Action>,
{
    config.check()?;

    let model = rig::model(config);
    let mut runs = Vec::with_capacity(config.len());

    for combination in config.combinations() {
        let index = combination.index;
        let launch_config = rig::launch_config(config, &combination)?;
        let firing = config.firing.firing()?;

        if let Some(Action::StopEarly) = observer.observe(&Event::Started { combination }) {
            return Ok(Report {
                status: Status::StoppedByObserver,
                runs,
            });
        }

        let mut session =
            Session::open(backend, &model).map_err(|source| BatchError::Open { index, source })?;

        let mut stop = false;
        let solution = launch::simulate(
            &mut *session,
            &launch_config,
            firing,
            |event: &launch::Event| {
                let event = Event::Launch {
                    index,
                    event: *event,
                };
                observer.observe(&event).map(|Action::StopEarly| {
                    stop = true;
                    launch::Action::StopEarly
                })
            },
        )
        .map_err(|source| BatchError::Launch { index, source })?;

        session
            .close()
            .map_err(|source| BatchError::Close { index, source })?;

        let finished = Event::Finished {
            index,
            status: solution.status,
        };
        runs.push(Run {
            combination,
            config: launch_config,
            solution,
        });

        if stop || observer.observe(&finished) == Some(Action::StopEarly) {
            return Ok(Report {
                status: Status::StoppedByObserver,
                runs,
            });
        }
    }

    Ok(Report {
        status: Status::Completed,
        runs,
    })
}

/// Runs [`run`] without observation.
///
/// # Errors
///
/// See [`run`].
pub fn run_unobserved<B: SolverBackend>(
    backend: &mut B,
    config: &SweepConfig,
) -> Result<Report, BatchError> {
    run(backend, config, ())
}
