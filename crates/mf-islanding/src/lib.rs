//! mf-islanding: energization as a solver decision.
//!
//! The default pipeline prunes de-energized components before assembly by
//! walking the enabled-branch topology. This extension replaces that with an
//! optimization view: the complete topology stays in the system, every node
//! gets a binary energization variable, and connectivity-flow constraints
//! tie it to the switching state of the branches. Solving then requires a
//! backend with integer support; the bundled Newton backend rejects such
//! systems.

mod connectivity;
mod reachability;

pub use reachability::reachable_nodes;

use connectivity::{carrier_nodes, connectivity_equations, declare_carrier, is_grid_forming, keys};
use mf_core::{Equation, EquationSystem, Expr, NodeId, SystemResult};
use mf_graph::{Carrier, Network, NetworkExtension};
use std::collections::HashSet;

/// Electrical islanding parameters.
#[derive(Clone, Copy, Debug)]
pub struct ElectricityIslanding {
    /// Upper bound on the connectivity flow through one branch. Must be at
    /// least the carrier's node count.
    pub big_m: f64,
    /// Voltage angle box for energized nodes; de-energized nodes are forced
    /// to zero angle.
    pub angle_bound_rad: f64,
}

impl Default for ElectricityIslanding {
    fn default() -> Self {
        Self {
            big_m: 200.0,
            angle_bound_rad: 3.15,
        }
    }
}

/// Hydraulic (gas or water) islanding parameters.
#[derive(Clone, Copy, Debug)]
pub struct HydraulicIslanding {
    pub big_m: f64,
}

impl Default for HydraulicIslanding {
    fn default() -> Self {
        Self { big_m: 200.0 }
    }
}

/// Per-carrier islanding configuration; carriers left as `None` keep the
/// default pruning behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct IslandingExtension {
    pub electricity: Option<ElectricityIslanding>,
    pub gas: Option<HydraulicIslanding>,
    pub water: Option<HydraulicIslanding>,
}

impl IslandingExtension {
    /// Islanding for every carrier at default parameters.
    pub fn all() -> Self {
        Self {
            electricity: Some(ElectricityIslanding::default()),
            gas: Some(HydraulicIslanding::default()),
            water: Some(HydraulicIslanding::default()),
        }
    }

    pub fn electricity_only() -> Self {
        Self {
            electricity: Some(ElectricityIslanding::default()),
            ..Self::default()
        }
    }

    fn big_m(&self, carrier: Carrier) -> Option<f64> {
        match carrier {
            Carrier::Electricity => self.electricity.map(|c| c.big_m),
            Carrier::Gas => self.gas.map(|c| c.big_m),
            Carrier::Water => self.water.map(|c| c.big_m),
        }
    }
}

impl NetworkExtension for IslandingExtension {
    fn name(&self) -> &'static str {
        "islanding"
    }

    fn manages_islanding(&self, carrier: Carrier) -> bool {
        self.big_m(carrier).is_some()
    }

    fn prepare(
        &self,
        net: &Network,
        sys: &mut EquationSystem,
        ignored: &HashSet<NodeId>,
    ) -> SystemResult<()> {
        for carrier in Carrier::ALL {
            if let Some(big_m) = self.big_m(carrier) {
                declare_carrier(net, sys, ignored, carrier, big_m)?;
            }
        }
        Ok(())
    }

    fn equations(
        &self,
        net: &Network,
        sys: &mut EquationSystem,
        ignored: &HashSet<NodeId>,
    ) -> SystemResult<()> {
        for carrier in Carrier::ALL {
            if let Some(big_m) = self.big_m(carrier) {
                connectivity_equations(net, sys, ignored, carrier, big_m)?;
            }
        }
        if let Some(cfg) = self.electricity {
            electrical_equations(net, sys, ignored, cfg)?;
        }
        if self.gas.is_some() {
            hydraulic_equations(net, sys, ignored, Carrier::Gas)?;
        }
        if self.water.is_some() {
            hydraulic_equations(net, sys, ignored, Carrier::Water)?;
        }
        Ok(())
    }
}

/// Ties voltage angles to energization: the grid-forming node anchors the
/// angle reference, every other angle collapses to zero when its node is
/// de-energized.
fn electrical_equations(
    net: &Network,
    sys: &mut EquationSystem,
    ignored: &HashSet<NodeId>,
    cfg: ElectricityIslanding,
) -> SystemResult<()> {
    let keys = keys(Carrier::Electricity);
    for node in carrier_nodes(net, Carrier::Electricity, ignored) {
        // Pinned angles need no constraint.
        if sys.var_id(node.eid(), "va_rad").is_none() {
            continue;
        }
        let va = sys.expr(node.eid(), "va_rad")?;
        if is_grid_forming(net, node) {
            sys.push(Equation::eq(va, Expr::Const(0.0)));
        } else {
            let bound = cfg.angle_bound_rad * sys.expr(node.eid(), keys.e)?;
            sys.push(Equation::le(va.clone(), bound.clone()));
            sys.push(Equation::ge(va, -bound));
        }
    }
    Ok(())
}

/// De-energized hydraulic nodes lose their pressure: `pressure_pu <= 2 e`
/// caps live nodes loosely and forces dead nodes to zero.
fn hydraulic_equations(
    net: &Network,
    sys: &mut EquationSystem,
    ignored: &HashSet<NodeId>,
    carrier: Carrier,
) -> SystemResult<()> {
    let keys = keys(carrier);
    for node in carrier_nodes(net, carrier, ignored) {
        if sys.var_id(node.eid(), "pressure_pu").is_none() {
            continue;
        }
        let pressure = sys.expr(node.eid(), "pressure_pu")?;
        let e = sys.expr(node.eid(), keys.e)?;
        sys.push(Equation::le(pressure, 2.0 * e));
    }
    Ok(())
}
