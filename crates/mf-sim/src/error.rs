//! Timeseries engine errors.

use mf_graph::NetworkError;
use mf_solver::SolverError;
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("series length {got} does not match the locked length {expected}")]
    SeriesLengthMismatch { expected: usize, got: usize },

    #[error("{steps} steps requested but the series carry only {available}")]
    StepsExceedSeries { steps: usize, available: usize },

    #[error("step {step} failed")]
    Step {
        step: usize,
        #[source]
        source: SolverError,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),
}
