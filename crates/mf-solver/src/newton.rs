//! Damped Newton iteration with backtracking line search.
//!
//! Square systems take an LU step; rectangular systems (more equations than
//! unknowns, as consistent overdetermined formulations produce) fall back to
//! an SVD least-squares step, turning the iteration into Gauss-Newton.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use nalgebra::{DMatrix, DVector};

pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Absolute tolerance on the residual norm.
    pub abs_tol: f64,
    /// Relative tolerance against the initial residual norm.
    pub rel_tol: f64,
    /// Finite difference step scale.
    pub fd_epsilon: f64,
    /// Line search backtracking factor.
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            fd_epsilon: 1e-7,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

#[derive(Debug)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

fn step(jac: &DMatrix<f64>, r: &DVector<f64>) -> SolverResult<DVector<f64>> {
    let rhs = -r;
    if jac.nrows() == jac.ncols() {
        jac.clone().lu().solve(&rhs).ok_or_else(|| SolverError::Numeric {
            what: "singular Jacobian".to_string(),
        })
    } else {
        jac.clone()
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|what| SolverError::Numeric {
                what: what.to_string(),
            })
    }
}

pub fn newton_solve<F>(
    x0: DVector<f64>,
    residual_fn: F,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut x = x0;
    let mut r = residual_fn(&x);
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    if !r_norm.is_finite() {
        return Err(SolverError::Numeric {
            what: "residual is not finite at the initial point".to_string(),
        });
    }

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = finite_difference_jacobian(&x, &residual_fn, config.fd_epsilon);
        let dx = step(&jac, &r)?;

        let mut alpha = 1.0;
        let mut x_new = &x + alpha * &dx;
        let mut r_new = residual_fn(&x_new);
        let mut r_new_norm = r_new.norm();

        for _ in 0..config.max_line_search_iters {
            if r_new_norm.is_finite() && r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = residual_fn(&x_new);
            r_new_norm = r_new.norm();
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;

        if alpha < 1e-10 {
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search stagnated at iteration {iter}"),
            });
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "maximum iterations {} reached, residual = {r_norm}",
            config.max_iterations
        ),
    })
}
