//! Model attributes: solver variables and fixed constants.
//!
//! Every numeric quantity a model exposes is an [`Attr`]: either a
//! [`VarSpec`] (a value the solver determines, with optional bounds, an
//! integrality flag and a tracked flag) or a plain constant. Models expose
//! their attributes by name through the [`VarSet`] trait, usually via the
//! [`impl_var_set!`](crate::impl_var_set) macro.

use serde::{Deserialize, Serialize};

/// Specification of a solver variable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    /// Current value: the initial guess before a solve, the solved value after.
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Integrality marker; only MILP-capable backends accept these.
    pub integer: bool,
    /// Tracked variables feed the inter-step state and are pinned by
    /// timeseries injection.
    pub tracked: bool,
}

impl VarSpec {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            min: None,
            max: None,
            integer: false,
            tracked: false,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }

    /// A {0, 1} integer variable, as used for energization indicators.
    pub fn binary(value: f64) -> Self {
        Self {
            value,
            min: Some(0.0),
            max: Some(1.0),
            integer: true,
            tracked: false,
        }
    }
}

/// A named numeric attribute of a model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Attr {
    Var(VarSpec),
    Const(f64),
}

impl Attr {
    pub fn var(value: f64) -> Self {
        Attr::Var(VarSpec::new(value))
    }

    pub fn con(value: f64) -> Self {
        Attr::Const(value)
    }

    pub fn value(&self) -> f64 {
        match self {
            Attr::Var(spec) => spec.value,
            Attr::Const(v) => *v,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Attr::Var(_))
    }

    pub fn set_value(&mut self, value: f64) {
        match self {
            Attr::Var(spec) => spec.value = value,
            Attr::Const(v) => *v = value,
        }
    }
}

/// Named-attribute reflection over a model.
///
/// The visitation style keeps models plain structs; the formulation layer
/// walks attributes to declare variables, the timeseries engine walks them
/// to inject series values and extract tracked state.
pub trait VarSet {
    fn visit_attrs(&self, f: &mut dyn FnMut(&'static str, &Attr));

    fn visit_attrs_mut(&mut self, f: &mut dyn FnMut(&'static str, &mut Attr));

    fn attr(&self, name: &str) -> Option<Attr> {
        let mut found = None;
        self.visit_attrs(&mut |n, a| {
            if n == name {
                found = Some(*a);
            }
        });
        found
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets the value of an existing attribute. Returns false when the model
    /// has no attribute of that name.
    fn set_attr(&mut self, name: &str, value: f64) -> bool {
        let mut found = false;
        self.visit_attrs_mut(&mut |n, a| {
            if n == name {
                a.set_value(value);
                found = true;
            }
        });
        found
    }

    /// Replaces an attribute with a constant, as done by grid-forming childs
    /// pinning their node's reference quantities. Returns false when absent.
    fn pin_attr(&mut self, name: &str, value: f64) -> bool {
        let mut found = false;
        self.visit_attrs_mut(&mut |n, a| {
            if n == name {
                *a = Attr::Const(value);
                found = true;
            }
        });
        found
    }
}

/// Implements [`VarSet`] for a model struct by listing its attribute fields.
#[macro_export]
macro_rules! impl_var_set {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::attr::VarSet for $ty {
            fn visit_attrs(&self, f: &mut dyn FnMut(&'static str, &$crate::attr::Attr)) {
                $(f(stringify!($field), &self.$field);)*
            }

            fn visit_attrs_mut(&mut self, f: &mut dyn FnMut(&'static str, &mut $crate::attr::Attr)) {
                $(f(stringify!($field), &mut self.$field);)*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Demo {
        flow: Attr,
        level: Attr,
    }

    impl_var_set!(Demo { flow, level });

    #[test]
    fn visitation_lists_fields_in_order() {
        let d = Demo {
            flow: Attr::var(1.0),
            level: Attr::con(2.0),
        };
        let mut names = Vec::new();
        d.visit_attrs(&mut |n, _| names.push(n));
        assert_eq!(names, vec!["flow", "level"]);
    }

    #[test]
    fn set_and_pin() {
        let mut d = Demo {
            flow: Attr::var(1.0),
            level: Attr::con(2.0),
        };
        assert!(d.set_attr("flow", 3.0));
        assert_eq!(d.attr("flow").map(|a| a.value()), Some(3.0));
        assert!(d.attr("flow").is_some_and(|a| a.is_var()));

        assert!(d.pin_attr("flow", 4.0));
        assert!(!d.attr("flow").is_some_and(|a| a.is_var()));

        assert!(!d.set_attr("missing", 0.0));
    }

    #[test]
    fn binary_spec() {
        let spec = VarSpec::binary(1.0);
        assert!(spec.integer);
        assert_eq!(spec.min, Some(0.0));
        assert_eq!(spec.max, Some(1.0));
    }
}
