//! The backend contract and the bundled Newton backend.

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, newton_solve};
use mf_core::{EquationSystem, Rel};
use nalgebra::DVector;
use tracing::debug;

/// A finished solve: one value per declared variable, in declaration order,
/// plus the objective value (zero when the system has none).
pub struct Solution {
    pub values: Vec<f64>,
    pub objective: f64,
}

/// A numeric backend. Backends see only the equation system; which
/// capabilities (integrality, inequalities, objectives) they accept is
/// theirs to decide and to reject with [`SolverError::Unsupported`].
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, sys: &EquationSystem) -> SolverResult<Solution>;
}

/// Newton-Raphson root finding over the equality constraints. Supports
/// square and consistent overdetermined systems; rejects integer variables,
/// inequalities and objectives.
#[derive(Default)]
pub struct NewtonBackend {
    pub config: NewtonConfig,
}

impl NewtonBackend {
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }
}

impl SolverBackend for NewtonBackend {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn solve(&self, sys: &EquationSystem) -> SolverResult<Solution> {
        if sys.has_integer_vars() {
            return Err(SolverError::Unsupported {
                what: "integer variables require a MILP-capable backend",
            });
        }
        if sys.has_inequalities() {
            return Err(SolverError::Unsupported {
                what: "inequality constraints",
            });
        }
        if sys.objective().is_some() {
            return Err(SolverError::Unsupported {
                what: "objectives require an optimizing backend",
            });
        }

        let n = sys.num_vars();
        let equations: Vec<_> = sys
            .equations()
            .iter()
            .filter(|eq| eq.rel == Rel::Eq)
            .cloned()
            .collect();
        // Degenerate bounds (min == max) pin a variable, as timeseries
        // injection does for tracked quantities.
        let pinned: Vec<(usize, f64)> = sys
            .decls()
            .iter()
            .enumerate()
            .filter_map(|(i, d)| match (d.spec.min, d.spec.max) {
                (Some(lo), Some(hi)) if lo == hi => Some((i, lo)),
                _ => None,
            })
            .collect();
        let m = equations.len() + pinned.len();
        if m < n {
            return Err(SolverError::Numeric {
                what: format!("underdetermined system: {m} equations for {n} variables"),
            });
        }
        let residual = |x: &DVector<f64>| {
            DVector::from_iterator(
                equations.len() + pinned.len(),
                equations
                    .iter()
                    .map(|eq| eq.residual(x.as_slice()))
                    .chain(pinned.iter().map(|&(i, v)| x[i] - v)),
            )
        };

        let x0 = DVector::from_vec(sys.initial_values());
        let result = newton_solve(x0, residual, &self.config)?;
        debug!(
            iterations = result.iterations,
            residual = result.residual_norm,
            "newton converged"
        );

        Ok(Solution {
            values: result.x.as_slice().to_vec(),
            objective: 0.0,
        })
    }
}
