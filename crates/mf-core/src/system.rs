//! The solver-facing equation system.
//!
//! Assembly declares every model variable into an arena keyed by
//! `(component, attribute name)`; constants are recorded alongside so that
//! equation templates can reference either uniformly through [`EquationSystem::expr`].
//! Backends receive the finished system and return a flat value vector the
//! caller writes back through the same keys.

use crate::attr::{Attr, VarSet, VarSpec};
use crate::error::{SystemError, SystemResult};
use crate::expr::{Equation, Expr, Rel, VarId};
use crate::ids::Eid;
use std::collections::HashMap;

/// A declared variable: its key plus the full spec it was declared with.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub eid: Eid,
    pub name: &'static str,
    pub spec: VarSpec,
}

#[derive(Debug, Default)]
pub struct EquationSystem {
    decls: Vec<VarDecl>,
    index: HashMap<(Eid, &'static str), VarId>,
    consts: HashMap<(Eid, &'static str), f64>,
    equations: Vec<Equation>,
    objective: Option<Expr>,
}

impl EquationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable; each `(component, name)` key may be declared once.
    pub fn declare(&mut self, eid: Eid, name: &'static str, spec: VarSpec) -> SystemResult<VarId> {
        if self.index.contains_key(&(eid, name)) || self.consts.contains_key(&(eid, name)) {
            return Err(SystemError::DuplicateKey { eid, name });
        }
        let id = self.decls.len();
        self.decls.push(VarDecl { eid, name, spec });
        self.index.insert((eid, name), id);
        Ok(id)
    }

    /// Records a constant under a key, making it addressable like a variable.
    pub fn declare_const(&mut self, eid: Eid, name: &'static str, value: f64) -> SystemResult<()> {
        if self.index.contains_key(&(eid, name)) || self.consts.contains_key(&(eid, name)) {
            return Err(SystemError::DuplicateKey { eid, name });
        }
        self.consts.insert((eid, name), value);
        Ok(())
    }

    /// Declares every attribute of a model: variables into the arena,
    /// constants into the constants table.
    pub fn declare_model(&mut self, eid: Eid, model: &dyn VarSet) -> SystemResult<()> {
        let mut attrs = Vec::new();
        model.visit_attrs(&mut |name, attr| attrs.push((name, *attr)));
        for (name, attr) in attrs {
            match attr {
                Attr::Var(spec) => {
                    self.declare(eid, name, spec)?;
                }
                Attr::Const(v) => self.declare_const(eid, name, v)?,
            }
        }
        Ok(())
    }

    /// Expression referencing a declared key: a variable reference or an
    /// inlined constant.
    pub fn expr(&self, eid: Eid, name: &'static str) -> SystemResult<Expr> {
        if let Some(&id) = self.index.get(&(eid, name)) {
            return Ok(Expr::Var(id));
        }
        if let Some(&v) = self.consts.get(&(eid, name)) {
            return Ok(Expr::Const(v));
        }
        Err(SystemError::UnknownKey {
            eid,
            name: name.to_string(),
        })
    }

    pub fn var_id(&self, eid: Eid, name: &'static str) -> Option<VarId> {
        self.index.get(&(eid, name)).copied()
    }

    pub fn is_declared(&self, eid: Eid, name: &'static str) -> bool {
        self.index.contains_key(&(eid, name)) || self.consts.contains_key(&(eid, name))
    }

    pub fn push(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    /// Adds a term to the scalar objective (created on first use).
    pub fn add_objective(&mut self, term: Expr) {
        self.objective = Some(match self.objective.take() {
            None => term,
            Some(existing) => existing + term,
        });
    }

    pub fn decls(&self) -> &[VarDecl] {
        &self.decls
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn objective(&self) -> Option<&Expr> {
        self.objective.as_ref()
    }

    pub fn num_vars(&self) -> usize {
        self.decls.len()
    }

    pub fn num_equations(&self) -> usize {
        self.equations.len()
    }

    /// Initial value vector, taken from the declared specs.
    pub fn initial_values(&self) -> Vec<f64> {
        self.decls.iter().map(|d| d.spec.value).collect()
    }

    pub fn has_integer_vars(&self) -> bool {
        self.decls.iter().any(|d| d.spec.integer)
    }

    pub fn has_inequalities(&self) -> bool {
        self.equations.iter().any(|e| e.rel != Rel::Eq)
    }
}
