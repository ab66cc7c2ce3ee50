use std::error::Error as StdError;

use coilgun_core::SessionError;

use crate::ConfigError;

/// Errors that can occur during a launch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid launch configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("solver call `{call}` failed: {source}")]
    Solver {
        call: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Error {
    pub(crate) fn solver<E: StdError + Send + Sync + 'static>(
        call: &'static str,
    ) -> impl FnOnce(E) -> Self {
        move |err| Self::Solver {
            call,
            source: Box::new(err),
        }
    }
}
