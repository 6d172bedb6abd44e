//! Solver error types.

use mf_formulation::FormulationError;
use mf_graph::NetworkError;
use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("numeric error: {what}")]
    Numeric { what: String },

    /// The assembled system needs capabilities this backend does not have,
    /// e.g. integer variables from an islanding extension handed to the
    /// Newton backend.
    #[error("unsupported by backend: {what}")]
    Unsupported { what: &'static str },

    #[error(transparent)]
    Formulation(#[from] FormulationError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}
