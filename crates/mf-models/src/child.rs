//! Child models: injections and withdrawals attached to nodes.
//!
//! Sign conventions follow the node balances: electrical childs store
//! consumption as positive (generators negate at construction), hydraulic
//! childs store injection as positive (sinks negate). Every child carries a
//! `regulation` factor in [0, 1] scaling its contribution.

use mf_core::{Attr, Equation, Expr, VarSpec, impl_var_set};
use mf_core::{Eid, EquationSystem, StepState, SystemResult};
use mf_graph::{ChildModel, ModelCommon, NodeModel, model_common};

/// Fixed electrical load.
#[derive(Clone, Debug)]
pub struct PowerLoad {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub regulation: Attr,
}

impl PowerLoad {
    pub fn new(p_mw: f64, q_mvar: f64) -> Self {
        Self {
            p_mw: Attr::con(p_mw),
            q_mvar: Attr::con(q_mvar),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(PowerLoad {
    p_mw,
    q_mvar,
    regulation
});
model_common!(PowerLoad);

impl ChildModel for PowerLoad {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// Fixed electrical generator; stores the negated setpoint.
#[derive(Clone, Debug)]
pub struct PowerGenerator {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub regulation: Attr,
}

impl PowerGenerator {
    pub fn new(p_mw: f64, q_mvar: f64) -> Self {
        Self {
            p_mw: Attr::con(-p_mw),
            q_mvar: Attr::con(-q_mvar),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(PowerGenerator {
    p_mw,
    q_mvar,
    regulation
});
model_common!(PowerGenerator);

impl ChildModel for PowerGenerator {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// External electrical grid: the slack of its component. Pins the node's
/// voltage and balances whatever power the rest of the system needs; the
/// solved exchange is tracked into the inter-step state.
#[derive(Clone, Debug)]
pub struct ExtPowerGrid {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub vm_pu: f64,
    pub va_rad: f64,
    pub regulation: Attr,
}

impl ExtPowerGrid {
    pub fn new(p_mw: f64, q_mvar: f64, vm_pu: f64, va_rad: f64) -> Self {
        Self {
            p_mw: Attr::Var(VarSpec::new(p_mw).tracked()),
            q_mvar: Attr::Var(VarSpec::new(q_mvar).tracked()),
            vm_pu,
            va_rad,
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(ExtPowerGrid {
    p_mw,
    q_mvar,
    regulation
});
model_common!(ExtPowerGrid);

impl ChildModel for ExtPowerGrid {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }

    fn overwrite(&self, node: &mut dyn NodeModel) {
        node.pin_attr("vm_pu", self.vm_pu);
        node.pin_attr("va_rad", self.va_rad);
    }

    fn grid_forming(&self) -> bool {
        true
    }
}

/// Fixed hydraulic withdrawal; stores the negated setpoint.
#[derive(Clone, Debug)]
pub struct Sink {
    pub mass_flow: Attr,
    pub regulation: Attr,
}

impl Sink {
    pub fn new(mass_flow: f64) -> Self {
        Self {
            mass_flow: Attr::con(-mass_flow),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(Sink {
    mass_flow,
    regulation
});
model_common!(Sink);

impl ChildModel for Sink {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// Fixed hydraulic injection.
#[derive(Clone, Debug)]
pub struct Source {
    pub mass_flow: Attr,
    pub regulation: Attr,
}

impl Source {
    pub fn new(mass_flow: f64) -> Self {
        Self {
            mass_flow: Attr::con(mass_flow),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(Source {
    mass_flow,
    regulation
});
model_common!(Source);

impl ChildModel for Source {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// External hydraulic grid: pins the node's pressure (and temperature where
/// the node has one) and balances the residual mass flow.
#[derive(Clone, Debug)]
pub struct ExtHydrGrid {
    pub mass_flow: Attr,
    pub pressure_pu: f64,
    pub t_k: f64,
    pub regulation: Attr,
}

impl ExtHydrGrid {
    pub fn new() -> Self {
        Self {
            mass_flow: Attr::Var(VarSpec::new(0.1).tracked()),
            pressure_pu: 1.0,
            t_k: 359.0,
            regulation: Attr::con(1.0),
        }
    }

    pub fn with_pressure(mut self, pressure_pu: f64) -> Self {
        self.pressure_pu = pressure_pu;
        self
    }

    pub fn with_temperature(mut self, t_k: f64) -> Self {
        self.t_k = t_k;
        self
    }
}

impl Default for ExtHydrGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl_var_set!(ExtHydrGrid {
    mass_flow,
    regulation
});
model_common!(ExtHydrGrid);

impl ChildModel for ExtHydrGrid {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }

    fn overwrite(&self, node: &mut dyn NodeModel) {
        node.pin_attr("pressure_pu", self.pressure_pu);
        node.pin_attr("t_k", self.t_k);
    }

    fn grid_forming(&self) -> bool {
        true
    }
}

/// Dispatchable generator able to energize an electrical island: its output
/// is a bounded variable rather than a fixed setpoint.
#[derive(Clone, Debug)]
pub struct GridFormingGenerator {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub regulation: Attr,
}

impl GridFormingGenerator {
    pub fn new(p_mw_max: f64, q_mvar: f64) -> Self {
        Self {
            p_mw: Attr::Var(VarSpec::new(-p_mw_max).with_bounds(-p_mw_max, 0.0)),
            q_mvar: Attr::con(-q_mvar),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(GridFormingGenerator {
    p_mw,
    q_mvar,
    regulation
});
model_common!(GridFormingGenerator);

impl ChildModel for GridFormingGenerator {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }

    fn grid_forming(&self) -> bool {
        true
    }
}

/// Dispatchable hydraulic source able to energize an island.
#[derive(Clone, Debug)]
pub struct GridFormingSource {
    pub mass_flow: Attr,
    pub regulation: Attr,
}

impl GridFormingSource {
    pub fn new(mass_flow_max: f64) -> Self {
        Self {
            mass_flow: Attr::Var(VarSpec::new(mass_flow_max).with_bounds(0.0, mass_flow_max)),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(GridFormingSource {
    mass_flow,
    regulation
});
model_common!(GridFormingSource);

impl ChildModel for GridFormingSource {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }

    fn grid_forming(&self) -> bool {
        true
    }
}

/// Free hydraulic flow coupled by a compound formulation.
#[derive(Clone, Debug)]
pub struct CouplingFlow {
    pub mass_flow: Attr,
    pub regulation: Attr,
}

impl CouplingFlow {
    pub fn new() -> Self {
        Self {
            mass_flow: Attr::var(0.0),
            regulation: Attr::con(1.0),
        }
    }
}

impl Default for CouplingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl_var_set!(CouplingFlow {
    mass_flow,
    regulation
});
model_common!(CouplingFlow);

impl ChildModel for CouplingFlow {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// Free electrical exchange coupled by a compound formulation.
#[derive(Clone, Debug)]
pub struct CouplingPower {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub regulation: Attr,
}

impl CouplingPower {
    pub fn new(q_mvar: f64) -> Self {
        Self {
            p_mw: Attr::var(0.0),
            q_mvar: Attr::con(q_mvar),
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(CouplingPower {
    p_mw,
    q_mvar,
    regulation
});
model_common!(CouplingPower);

impl ChildModel for CouplingPower {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

/// Generator with ramp-rate limits between consecutive timeseries steps.
///
/// Demonstrates the inter-step contract: the solved output is carried into
/// the step state, and the next step constrains its change. On the first
/// step (no previous value) no constraint is emitted.
#[derive(Clone, Debug)]
pub struct RampGenerator {
    pub p_mw: Attr,
    pub q_mvar: Attr,
    pub ramp_up_mw: f64,
    pub ramp_down_mw: f64,
    pub regulation: Attr,
}

impl RampGenerator {
    pub fn new(p_mw_max: f64, ramp_up_mw: f64, ramp_down_mw: f64) -> Self {
        Self {
            p_mw: Attr::Var(VarSpec::new(0.0).with_bounds(-p_mw_max, 0.0).tracked()),
            q_mvar: Attr::con(0.0),
            ramp_up_mw,
            ramp_down_mw,
            regulation: Attr::con(1.0),
        }
    }
}

impl_var_set!(RampGenerator {
    p_mw,
    q_mvar,
    regulation
});

impl ModelCommon for RampGenerator {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "RampGenerator"
    }

    fn inter_step_vars(&self) -> &'static [&'static str] {
        &["p_mw"]
    }

    fn inter_step_equations(
        &self,
        sys: &mut EquationSystem,
        prev: &StepState,
        eid: Eid,
    ) -> SystemResult<()> {
        if let Some(prev_p) = prev.get(eid, "p_mw") {
            let p = sys.expr(eid, "p_mw")?;
            sys.push(Equation::le(
                p.clone() - prev_p,
                Expr::Const(self.ramp_up_mw),
            ));
            sys.push(Equation::le(prev_p - p, Expr::Const(self.ramp_down_mw)));
        }
        Ok(())
    }
}

impl ChildModel for RampGenerator {
    fn clone_child(&self) -> Box<dyn ChildModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::{ChildId, VarSet};

    #[test]
    fn generator_negates_setpoint() {
        let generator = PowerGenerator::new(1.0, 0.5);
        assert_eq!(generator.p_mw.value(), -1.0);
        assert_eq!(generator.q_mvar.value(), -0.5);
    }

    #[test]
    fn sink_negates_source_does_not() {
        assert_eq!(Sink::new(0.1).mass_flow.value(), -0.1);
        assert_eq!(Source::new(0.1).mass_flow.value(), 0.1);
    }

    #[test]
    fn ext_power_grid_pins_node_voltage() {
        use crate::node::Bus;

        let ext = ExtPowerGrid::new(0.0, 0.0, 1.02, 0.0);
        let mut bus = Bus::new(1.0);
        ext.overwrite(&mut bus);
        assert!(!bus.vm_pu.is_var());
        assert_eq!(bus.vm_pu.value(), 1.02);
        assert!(ext.grid_forming());
    }

    #[test]
    fn ext_hydr_grid_pin_tolerates_missing_temperature() {
        use crate::node::GasJunction;

        let ext = ExtHydrGrid::new();
        let mut junction = GasJunction::new();
        ext.overwrite(&mut junction);
        assert!(!junction.pressure_pu.is_var());
    }

    #[test]
    fn ramp_constraints_only_with_previous_state() {
        let generator = RampGenerator::new(1.0, 0.2, 0.2);
        let eid = Eid::Child(ChildId::from_index(0));

        let mut sys = EquationSystem::new();
        sys.declare_model(eid, &generator).unwrap();

        let empty = StepState::new();
        generator.inter_step_equations(&mut sys, &empty, eid).unwrap();
        assert_eq!(sys.num_equations(), 0);

        let mut prev = StepState::new();
        prev.set(eid, "p_mw", -0.5);
        generator.inter_step_equations(&mut sys, &prev, eid).unwrap();
        assert_eq!(sys.num_equations(), 2);
        assert!(generator.attr("p_mw").is_some_and(|a| a.is_var()));
    }
}
