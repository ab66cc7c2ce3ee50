//! A scripted in-memory [`ForceSolver`] for tests.
//!
//! [`ScriptedSolver`] records every adapter call, tracks body translations and
//! circuit current, and answers force queries from a user-supplied function.
//! It enforces the solve-before-query ordering so tests catch kernels that
//! read forces from a stale solution.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use thiserror::Error;
use uom::{
    ConstZero,
    si::f64::{ElectricCurrent, Force, Length},
};

use crate::{ForceSolver, GroupId, LabelPosition, ModelRef, SolverBackend, Winding};

/// A recorded adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open,
    LoadGeometry(String),
    SelectBody(GroupId),
    SetWinding {
        label: LabelPosition,
        turns: u32,
        circuit: Option<String>,
    },
    TranslateBody {
        group: GroupId,
        delta: Length,
    },
    SetCircuitCurrent {
        circuit: String,
        current: ElectricCurrent,
    },
    SolveAndLoad,
    IntegrateForce(GroupId),
    Close,
}

/// The solver state a force function sees when a force is integrated.
#[derive(Debug, Clone)]
pub struct ForceQuery {
    /// The queried body.
    pub group: GroupId,

    /// Net translation applied to the body since the session opened.
    pub offset: Length,

    /// The most recently assigned circuit current.
    pub current: ElectricCurrent,

    /// Coil blocks that currently carry a winding, with their turn counts.
    pub energized: Vec<(LabelPosition, u32)>,
}

/// Error returned by a scripted call configured to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scripted solver failure in `{0}`")]
pub struct ScriptedError(pub &'static str);

type ForceFn = Rc<dyn Fn(&ForceQuery) -> Force>;

/// An in-memory solver double.
///
/// Clones share the call log and close counter, so a backend can hand out
/// sessions while the test keeps a handle for inspection.
#[derive(Clone)]
pub struct ScriptedSolver {
    force: ForceFn,
    log: Rc<RefCell<Vec<Call>>>,
    closes: Rc<Cell<usize>>,
    fail_on: Option<&'static str>,
    offsets: HashMap<GroupId, Length>,
    windings: Vec<(LabelPosition, u32)>,
    current: ElectricCurrent,
    solved: bool,
}

impl fmt::Debug for ScriptedSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedSolver")
            .field("fail_on", &self.fail_on)
            .field("offsets", &self.offsets)
            .field("current", &self.current)
            .field("solved", &self.solved)
            .finish_non_exhaustive()
    }
}

impl ScriptedSolver {
    /// Creates a solver that answers every force query with `force`.
    pub fn with_force(force: impl Fn(&ForceQuery) -> Force + 'static) -> Self {
        Self {
            force: Rc::new(force),
            log: Rc::default(),
            closes: Rc::default(),
            fail_on: None,
            offsets: HashMap::new(),
            windings: Vec::new(),
            current: ElectricCurrent::ZERO,
            solved: false,
        }
    }

    /// Creates a solver that always reports zero force.
    #[must_use]
    pub fn zero_force() -> Self {
        Self::with_force(|_| Force::ZERO)
    }

    /// Creates a solver that always reports the same force.
    #[must_use]
    pub fn constant(force: Force) -> Self {
        Self::with_force(move |_| force)
    }

    /// Makes every call named `call` fail with a [`ScriptedError`].
    ///
    /// Names match the [`ForceSolver`] method names, e.g. `"solve_and_load"`.
    #[must_use]
    pub fn fail_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Returns a copy of every call recorded so far, across all sessions.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    /// Returns how many sessions have been closed.
    #[must_use]
    pub fn closed_sessions(&self) -> usize {
        self.closes.get()
    }

    fn record(&mut self, name: &'static str, call: Call) -> Result<(), ScriptedError> {
        self.log.borrow_mut().push(call);
        if self.fail_on == Some(name) {
            return Err(ScriptedError(name));
        }
        Ok(())
    }

    fn fresh(&self) -> Self {
        Self {
            offsets: HashMap::new(),
            windings: Vec::new(),
            current: ElectricCurrent::ZERO,
            solved: false,
            ..self.clone()
        }
    }
}

impl ForceSolver for ScriptedSolver {
    type Error = ScriptedError;

    fn load_geometry(&mut self, model: &ModelRef) -> Result<(), Self::Error> {
        self.record("load_geometry", Call::LoadGeometry(model.as_str().to_owned()))
    }

    fn select_body(&mut self, group: GroupId) -> Result<(), Self::Error> {
        self.record("select_body", Call::SelectBody(group))
    }

    fn set_coil_winding(
        &mut self,
        label: LabelPosition,
        winding: Winding<'_>,
    ) -> Result<(), Self::Error> {
        let (turns, circuit) = match winding {
            Winding::Off => (0, None),
            Winding::Energized { turns, circuit } => (turns, Some(circuit.to_owned())),
        };
        self.record(
            "set_coil_winding",
            Call::SetWinding {
                label,
                turns,
                circuit,
            },
        )?;

        self.windings.retain(|(existing, _)| *existing != label);
        if turns > 0 {
            self.windings.push((label, turns));
        }
        self.solved = false;
        Ok(())
    }

    fn translate_body(&mut self, group: GroupId, delta: Length) -> Result<(), Self::Error> {
        self.record("translate_body", Call::TranslateBody { group, delta })?;
        *self.offsets.entry(group).or_insert(Length::ZERO) += delta;
        self.solved = false;
        Ok(())
    }

    fn set_circuit_current(
        &mut self,
        circuit: &str,
        current: ElectricCurrent,
    ) -> Result<(), Self::Error> {
        self.record(
            "set_circuit_current",
            Call::SetCircuitCurrent {
                circuit: circuit.to_owned(),
                current,
            },
        )?;
        self.current = current;
        self.solved = false;
        Ok(())
    }

    fn solve_and_load(&mut self) -> Result<(), Self::Error> {
        self.record("solve_and_load", Call::SolveAndLoad)?;
        self.solved = true;
        Ok(())
    }

    fn integrate_force(&mut self, group: GroupId) -> Result<Force, Self::Error> {
        self.record("integrate_force", Call::IntegrateForce(group))?;
        if !self.solved {
            return Err(ScriptedError("integrate_force before solve_and_load"));
        }

        let query = ForceQuery {
            group,
            offset: self.offsets.get(&group).copied().unwrap_or(Length::ZERO),
            current: self.current,
            energized: self.windings.clone(),
        };
        Ok((self.force)(&query))
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.closes.set(self.closes.get() + 1);
        self.record("close", Call::Close)
    }
}

/// A backend that opens fresh copies of a template [`ScriptedSolver`].
#[derive(Debug)]
pub struct ScriptedBackend {
    template: ScriptedSolver,
    fail_open: bool,
}

impl ScriptedBackend {
    pub fn new(template: ScriptedSolver) -> Self {
        Self {
            template,
            fail_open: false,
        }
    }

    /// Makes every `open_session` call fail.
    #[must_use]
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Returns every call recorded across all sessions.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.template.calls()
    }

    /// Returns how many sessions have been closed.
    #[must_use]
    pub fn closed_sessions(&self) -> usize {
        self.template.closed_sessions()
    }
}

impl SolverBackend for ScriptedBackend {
    type Solver = ScriptedSolver;
    type Error = ScriptedError;

    fn open_session(&mut self) -> Result<Self::Solver, Self::Error> {
        if self.fail_open {
            return Err(ScriptedError("open_session"));
        }
        self.template.log.borrow_mut().push(Call::Open);
        Ok(self.template.fresh())
    }
}
