//! Finite difference Jacobians over residual closures.

use nalgebra::{DMatrix, DVector};

/// Forward-difference Jacobian: column j is `(f(x + h e_j) - f(x)) / h`
/// with a step scaled to the magnitude of `x[j]`.
pub fn finite_difference_jacobian<F>(x: &DVector<f64>, f: F, epsilon: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let f_x = f(x);
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);
    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed) - &f_x) / dx;
        jac.set_column(j, &df);
    }
    jac
}

/// Central-difference Jacobian; twice the evaluations for one extra order
/// of accuracy.
pub fn central_difference_jacobian<F>(x: &DVector<f64>, f: F, epsilon: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let m = f(x).len();

    let mut jac = DMatrix::zeros(m, n);
    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let mut x_minus = x.clone();
        x_minus[j] -= dx;

        let df = (f(&x_plus) - f(&x_minus)) / (2.0 * dx);
        jac.set_column(j, &df);
    }
    jac
}
