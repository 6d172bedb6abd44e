//! Compound models: cross-carrier coupling units.
//!
//! A compound expands into owned coupling components (free-flow childs and
//! a heat exchanger branch); its formulation then ties their flows together
//! through explicit conversion equations. Conversion between gas mass flow
//! and energy uses the gas grid's higher heating value:
//! `MW = kg/s * 3.6 * hhv_kwh_per_kg`.

use crate::branch::HeatExchanger;
use crate::child::{CouplingFlow, CouplingPower};
use mf_core::{Attr, BranchId, ChildId, Eid, impl_var_set};
use mf_graph::{
    Carrier, CompoundModel, ConnectionMap, Network, NetworkError, NetworkResult, model_common,
};

fn connection(map: &ConnectionMap, role: &'static str) -> NetworkResult<mf_core::NodeId> {
    map.get(role)
        .copied()
        .ok_or(NetworkError::MissingConnection { role })
}

/// Combined heat and power unit: consumes gas, injects electrical power and
/// heat at fixed efficiencies.
///
/// Connections: `gas` (gas junction), `power` (bus), `heat` and
/// `heat_return` (water junctions); the heat exchanger spans return → feed.
#[derive(Clone, Debug)]
pub struct Chp {
    pub mass_flow_setpoint: Attr,
    pub efficiency_power: f64,
    pub efficiency_heat: f64,
    pub q_mvar: f64,
    gas_child: Option<ChildId>,
    power_child: Option<ChildId>,
    heat_branch: Option<BranchId>,
}

impl Chp {
    pub fn new(mass_flow_setpoint: f64, efficiency_power: f64, efficiency_heat: f64) -> Self {
        Self {
            mass_flow_setpoint: Attr::con(mass_flow_setpoint),
            efficiency_power,
            efficiency_heat,
            q_mvar: 0.0,
            gas_child: None,
            power_child: None,
            heat_branch: None,
        }
    }

    pub fn gas_child(&self) -> Option<ChildId> {
        self.gas_child
    }

    pub fn power_child(&self) -> Option<ChildId> {
        self.power_child
    }

    pub fn heat_branch(&self) -> Option<BranchId> {
        self.heat_branch
    }
}

impl_var_set!(Chp { mass_flow_setpoint });
model_common!(Chp);

impl CompoundModel for Chp {
    fn clone_compound(&self) -> Box<dyn CompoundModel> {
        Box::new(self.clone())
    }

    fn connection_roles(&self) -> &'static [(&'static str, Carrier)] {
        &[
            ("gas", Carrier::Gas),
            ("power", Carrier::Electricity),
            ("heat", Carrier::Water),
            ("heat_return", Carrier::Water),
        ]
    }

    fn expand(
        &mut self,
        net: &mut Network,
        connections: &ConnectionMap,
    ) -> NetworkResult<Vec<Eid>> {
        let gas_node = connection(connections, "gas")?;
        let power_node = connection(connections, "power")?;
        let heat_node = connection(connections, "heat")?;
        let heat_return_node = connection(connections, "heat_return")?;

        let gas_child = net.add_child(gas_node, Box::new(CouplingFlow::new()))?;
        let power_child = net.add_child(power_node, Box::new(CouplingPower::new(-self.q_mvar)))?;
        let heat_grid = net.node(heat_node)?.grid;
        let heat_branch = net.add_branch(
            Box::new(HeatExchanger::coupling()),
            heat_return_node,
            heat_node,
            heat_grid,
        )?;

        self.gas_child = Some(gas_child);
        self.power_child = Some(power_child);
        self.heat_branch = Some(heat_branch);
        Ok(vec![gas_child.into(), power_child.into(), heat_branch.into()])
    }
}

/// Power-to-heat unit: draws a fixed electrical power and injects it into
/// the heat network at a conversion efficiency.
#[derive(Clone, Debug)]
pub struct PowerToHeat {
    pub p_mw_setpoint: Attr,
    pub efficiency: f64,
    pub q_mvar: f64,
    power_child: Option<ChildId>,
    heat_branch: Option<BranchId>,
}

impl PowerToHeat {
    pub fn new(p_mw_setpoint: f64, efficiency: f64) -> Self {
        Self {
            p_mw_setpoint: Attr::con(p_mw_setpoint),
            efficiency,
            q_mvar: 0.0,
            power_child: None,
            heat_branch: None,
        }
    }

    pub fn power_child(&self) -> Option<ChildId> {
        self.power_child
    }

    pub fn heat_branch(&self) -> Option<BranchId> {
        self.heat_branch
    }
}

impl_var_set!(PowerToHeat { p_mw_setpoint });
model_common!(PowerToHeat);

impl CompoundModel for PowerToHeat {
    fn clone_compound(&self) -> Box<dyn CompoundModel> {
        Box::new(self.clone())
    }

    fn connection_roles(&self) -> &'static [(&'static str, Carrier)] {
        &[
            ("power", Carrier::Electricity),
            ("heat", Carrier::Water),
            ("heat_return", Carrier::Water),
        ]
    }

    fn expand(
        &mut self,
        net: &mut Network,
        connections: &ConnectionMap,
    ) -> NetworkResult<Vec<Eid>> {
        let power_node = connection(connections, "power")?;
        let heat_node = connection(connections, "heat")?;
        let heat_return_node = connection(connections, "heat_return")?;

        let power_child = net.add_child(power_node, Box::new(CouplingPower::new(self.q_mvar)))?;
        let heat_grid = net.node(heat_node)?.grid;
        let heat_branch = net.add_branch(
            Box::new(HeatExchanger::coupling()),
            heat_return_node,
            heat_node,
            heat_grid,
        )?;

        self.power_child = Some(power_child);
        self.heat_branch = Some(heat_branch);
        Ok(vec![power_child.into(), heat_branch.into()])
    }
}
