//! Expression AST and equations.
//!
//! Formulations build residual expressions over arena variable ids instead
//! of mutating model state; a backend evaluates them against its candidate
//! solution vector. Operator overloads keep equation templates close to the
//! mathematical notation.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Index of a declared variable within an [`EquationSystem`](crate::EquationSystem).
pub type VarId = usize;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(VarId),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    /// Integer power; all the bundled physics needs.
    Pow(Box<Expr>, i32),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Abs(Box<Expr>),
}

impl Expr {
    pub fn sin(self) -> Expr {
        Expr::Sin(Box::new(self))
    }

    pub fn cos(self) -> Expr {
        Expr::Cos(Box::new(self))
    }

    pub fn abs(self) -> Expr {
        Expr::Abs(Box::new(self))
    }

    pub fn powi(self, exp: i32) -> Expr {
        Expr::Pow(Box::new(self), exp)
    }

    pub fn squared(self) -> Expr {
        self.powi(2)
    }

    /// Evaluates against a candidate solution vector. Out-of-range variable
    /// references evaluate to NaN, which backends surface as numeric errors.
    pub fn eval(&self, values: &[f64]) -> f64 {
        match self {
            Expr::Const(v) => *v,
            Expr::Var(id) => values.get(*id).copied().unwrap_or(f64::NAN),
            Expr::Add(a, b) => a.eval(values) + b.eval(values),
            Expr::Sub(a, b) => a.eval(values) - b.eval(values),
            Expr::Mul(a, b) => a.eval(values) * b.eval(values),
            Expr::Div(a, b) => a.eval(values) / b.eval(values),
            Expr::Neg(a) => -a.eval(values),
            Expr::Pow(a, exp) => a.eval(values).powi(*exp),
            Expr::Sin(a) => a.eval(values).sin(),
            Expr::Cos(a) => a.eval(values).cos(),
            Expr::Abs(a) => a.eval(values).abs(),
        }
    }

    /// Collects the variable ids referenced by this expression.
    pub fn collect_vars(&self, out: &mut Vec<VarId>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(id) => out.push(*id),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Expr::Neg(a) | Expr::Pow(a, _) | Expr::Sin(a) | Expr::Cos(a) | Expr::Abs(a) => {
                a.collect_vars(out);
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Const(v)
    }
}

macro_rules! binop {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$variant(Box::new(self), Box::new(Expr::Const(rhs)))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Const(self)), Box::new(rhs))
            }
        }
    };
}

binop!(Add, add, Add);
binop!(Sub, sub, Sub);
binop!(Mul, mul, Mul);
binop!(Div, div, Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

/// Sums an iterator of expressions; empty input folds to zero.
pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Expr {
    let mut it = terms.into_iter();
    match it.next() {
        None => Expr::Const(0.0),
        Some(first) => it.fold(first, |acc, t| acc + t),
    }
}

/// Relation between the two sides of an equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rel {
    Eq,
    Le,
    Ge,
}

/// A single constraint: `lhs <rel> rhs`.
#[derive(Clone, Debug)]
pub struct Equation {
    pub lhs: Expr,
    pub rel: Rel,
    pub rhs: Expr,
}

impl Equation {
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self {
            lhs,
            rel: Rel::Eq,
            rhs,
        }
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Self {
            lhs,
            rel: Rel::Le,
            rhs,
        }
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Self {
            lhs,
            rel: Rel::Ge,
            rhs,
        }
    }

    /// Signed residual `lhs - rhs`.
    pub fn residual(&self, values: &[f64]) -> f64 {
        self.lhs.eval(values) - self.rhs.eval(values)
    }

    /// Whether the relation holds within `tol`.
    pub fn holds(&self, values: &[f64], tol: f64) -> bool {
        let r = self.residual(values);
        match self.rel {
            Rel::Eq => r.abs() <= tol,
            Rel::Le => r <= tol,
            Rel::Ge => r >= -tol,
        }
    }
}
