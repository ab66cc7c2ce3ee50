use std::fmt;

use serde::{Deserialize, Serialize};
use uom::si::f64::{ElectricCurrent, Force, Length};

/// Identifies a body (block group) inside the solver's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// The point used to select a coil's winding block in the solver geometry.
///
/// Axisymmetric models address blocks by a radial and an axial coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPosition {
    pub radial: Length,
    pub axial: Length,
}

/// An opaque reference to a solver model file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef(String);

impl ModelRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Winding assignment for a coil block.
///
/// A coil with no turns and no circuit carries no current, so switching a
/// coil off is expressed by assigning [`Winding::Off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding<'a> {
    /// No turns, no circuit.
    Off,

    /// `turns` windings attached to the named circuit.
    Energized { turns: u32, circuit: &'a str },
}

/// A blocking magnetostatic force solver driven by the launch kernel.
///
/// The kernel calls these methods in a fixed order every step. Querying the
/// force before [`solve_and_load`](ForceSolver::solve_and_load) has run for
/// the current geometry and current is undefined, and implementations may
/// return stale values or an error.
///
/// Lengths and currents are SI quantities; adapters convert them to whatever
/// units the underlying solver uses.
pub trait ForceSolver {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the model geometry for this session.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the model cannot be opened.
    fn load_geometry(&mut self, model: &ModelRef) -> Result<(), Self::Error>;

    /// Selects the body that subsequent body operations act on.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the group does not exist.
    fn select_body(&mut self, group: GroupId) -> Result<(), Self::Error>;

    /// Assigns a winding to the coil block found at `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if no block exists at `label`.
    fn set_coil_winding(
        &mut self,
        label: LabelPosition,
        winding: Winding<'_>,
    ) -> Result<(), Self::Error>;

    /// Moves a body along the launch axis by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the body cannot be moved.
    fn translate_body(&mut self, group: GroupId, delta: Length) -> Result<(), Self::Error>;

    /// Sets the total current of a named circuit.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the circuit does not exist.
    fn set_circuit_current(
        &mut self,
        circuit: &str,
        current: ElectricCurrent,
    ) -> Result<(), Self::Error>;

    /// Runs the analysis and loads its solution. Blocks until done.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the analysis fails.
    fn solve_and_load(&mut self) -> Result<(), Self::Error>;

    /// Integrates the axial force acting on a body in the loaded solution.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if no solution is loaded.
    fn integrate_force(&mut self, group: GroupId) -> Result<Force, Self::Error>;

    /// Ends the session and releases the solver.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the solver does not shut down cleanly.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// Opens solver sessions.
///
/// The solver is exclusive and stateful: a backend hands out one session at a
/// time, and a session must be closed before the next is opened.
pub trait SolverBackend {
    type Solver: ForceSolver;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Opens and initializes a fresh solver session.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the solver cannot be started.
    fn open_session(&mut self) -> Result<Self::Solver, Self::Error>;
}
