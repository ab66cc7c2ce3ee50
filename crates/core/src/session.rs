use std::{
    error::Error as StdError,
    ops::{Deref, DerefMut},
};

use thiserror::Error;

use crate::{ForceSolver, ModelRef, SolverBackend};

/// Errors that can occur while acquiring or releasing a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open solver session: {0}")]
    Open(#[source] Box<dyn StdError + Send + Sync>),

    #[error("failed to load geometry `{model}`: {source}")]
    Geometry {
        model: ModelRef,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed to close solver session: {0}")]
    Close(#[source] Box<dyn StdError + Send + Sync>),
}

/// An exclusively owned solver session with scoped release.
///
/// A session is opened from a [`SolverBackend`] with its geometry already
/// loaded, and is closed exactly once: explicitly through
/// [`close`](Session::close), or on drop if the owner bailed out early.
/// Errors raised while closing on drop are discarded; call `close` to observe
/// them.
#[derive(Debug)]
pub struct Session<S: ForceSolver> {
    solver: Option<S>,
}

impl<S: ForceSolver> Session<S> {
    /// Opens a fresh session and loads `model` into it.
    ///
    /// If loading the geometry fails the session is closed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Open`] if the backend cannot start a solver, or
    /// [`SessionError::Geometry`] if the model cannot be loaded.
    pub fn open<B>(backend: &mut B, model: &ModelRef) -> Result<Self, SessionError>
    where
        B: SolverBackend<Solver = S>,
    {
        let solver = backend
            .open_session()
            .map_err(|err| SessionError::Open(Box::new(err)))?;

        let mut session = Self {
            solver: Some(solver),
        };

        session
            .load_geometry(model)
            .map_err(|err| SessionError::Geometry {
                model: model.clone(),
                source: Box::new(err),
            })?;

        Ok(session)
    }

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Close`] if the solver fails to shut down.
    pub fn close(mut self) -> Result<(), SessionError> {
        match self.solver.take() {
            Some(mut solver) => solver
                .close()
                .map_err(|err| SessionError::Close(Box::new(err))),
            None => Ok(()),
        }
    }
}

impl<S: ForceSolver> Deref for Session<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.solver
            .as_ref()
            .unwrap_or_else(|| unreachable!("solver is present until close or drop"))
    }
}

impl<S: ForceSolver> DerefMut for Session<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.solver
            .as_mut()
            .unwrap_or_else(|| unreachable!("solver is present until close or drop"))
    }
}

impl<S: ForceSolver> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(mut solver) = self.solver.take() {
            // Drop has no caller to report to; `close` surfaces this error.
            let _ = solver.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{Call, ScriptedBackend, ScriptedSolver};

    #[test]
    fn open_loads_geometry() {
        let mut backend = ScriptedBackend::new(ScriptedSolver::zero_force());
        let session = Session::open(&mut backend, &ModelRef::new("rig.fem")).unwrap();

        assert_eq!(
            session.calls(),
            vec![Call::Open, Call::LoadGeometry("rig.fem".to_string())]
        );
        session.close().unwrap();
        assert_eq!(backend.closed_sessions(), 1);
    }

    #[test]
    fn dropping_a_session_closes_it() {
        let mut backend = ScriptedBackend::new(ScriptedSolver::zero_force());
        {
            let _session = Session::open(&mut backend, &ModelRef::new("rig.fem")).unwrap();
        }
        assert_eq!(backend.closed_sessions(), 1);
    }

    #[test]
    fn failed_geometry_load_still_closes() {
        let mut backend =
            ScriptedBackend::new(ScriptedSolver::zero_force().fail_on("load_geometry"));

        let err = Session::open(&mut backend, &ModelRef::new("missing.fem")).unwrap_err();

        assert!(matches!(err, SessionError::Geometry { .. }));
        assert_eq!(backend.closed_sessions(), 1);
    }

    #[test]
    fn close_reports_solver_errors() {
        let mut backend = ScriptedBackend::new(ScriptedSolver::zero_force().fail_on("close"));
        let session = Session::open(&mut backend, &ModelRef::new("rig.fem")).unwrap();

        let err = session.close().unwrap_err();

        assert!(matches!(err, SessionError::Close(_)));
        assert_eq!(backend.closed_sessions(), 1);
    }

    #[test]
    fn drop_swallows_close_errors() {
        let mut backend = ScriptedBackend::new(ScriptedSolver::zero_force().fail_on("close"));
        {
            let _session = Session::open(&mut backend, &ModelRef::new("rig.fem")).unwrap();
        }
        assert_eq!(backend.closed_sessions(), 1);
        assert_eq!(backend.calls().last(), Some(&Call::Close));
    }
}
