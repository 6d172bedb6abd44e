//! mf-solver: backend contract and the bundled Newton-Raphson backend.
//!
//! A backend consumes an assembled [`EquationSystem`](mf_core::EquationSystem)
//! and returns a flat solution vector; [`solve`] wraps the full pipeline of
//! assembly, backend dispatch, write-back and result tables.

pub mod backend;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod result;
pub mod solve;

pub use backend::{NewtonBackend, Solution, SolverBackend};
pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use result::{ResultRow, ResultTable, SolveReport};
pub use solve::{solve, solve_with_state};
