//! Compound formulations: conversion equations tying the owned coupling
//! components of a cross-carrier unit together.

use crate::error::{FormResult, FormulationError};
use crate::formulation::{CompoundCtx, CompoundFormulation};
use mf_core::{Eid, Equation, EquationSystem};
use mf_graph::Network;
use mf_models::{Chp, PowerToHeat};

/// Seconds-per-hour over watts-per-megawatt: `kg/s * 3.6 * hhv_kwh_per_kg`
/// is the fuel power in MW.
const KG_PER_S_TO_KWH_FACTOR: f64 = 3.6;
const W_PER_MW: f64 = 1e6;

fn downcast_compound<'a, M: 'static>(
    ctx: &'a CompoundCtx<'_>,
    expected: &'static str,
) -> FormResult<&'a M> {
    ctx.compound
        .model
        .as_any()
        .downcast_ref::<M>()
        .ok_or(FormulationError::ModelMismatch {
            eid: ctx.compound.eid(),
            expected,
        })
}

fn expanded<T>(id: Option<T>, eid: Eid) -> FormResult<T> {
    id.ok_or(FormulationError::NotExpanded { eid })
}

fn gas_hhv(net: &Network, child_id: mf_core::ChildId, eid: Eid) -> FormResult<f64> {
    let child = net.child(child_id)?;
    let node = net.node(child.node_id)?;
    let grid = node
        .grid
        .map(|g| net.grid(g))
        .transpose()?
        .and_then(|g| g.as_gas())
        .ok_or(FormulationError::GridMismatch {
            eid,
            expected: "gas",
        })?;
    Ok(grid.higher_heating_value_kwh_per_kg)
}

/// CHP: the gas withdrawal is the setpoint, and the fuel power splits into
/// electrical output and heat at the two efficiencies.
pub struct ChpFormulation;

impl CompoundFormulation for ChpFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &CompoundCtx<'_>) -> FormResult<()> {
        let eid = ctx.compound.eid();
        let chp: &Chp = downcast_compound(ctx, "Chp")?;
        let gas_child = expanded(chp.gas_child(), eid)?;
        let power_child = expanded(chp.power_child(), eid)?;
        let heat_branch = expanded(chp.heat_branch(), eid)?;
        let hhv = gas_hhv(ctx.net, gas_child, eid)?;

        let setpoint = sys.expr(eid, "mass_flow_setpoint")?;
        let fuel_mw = setpoint.clone() * KG_PER_S_TO_KWH_FACTOR * hhv;

        // Hydraulic withdrawal is negative, electrical generation is
        // negative, heat injection is negative q_w.
        sys.push(Equation::eq(
            sys.expr(gas_child.into(), "mass_flow")?,
            -setpoint,
        ));
        sys.push(Equation::eq(
            sys.expr(power_child.into(), "p_mw")?,
            -(fuel_mw.clone() * chp.efficiency_power),
        ));
        sys.push(Equation::eq(
            sys.expr(heat_branch.into(), "q_w")?,
            -(fuel_mw * chp.efficiency_heat * W_PER_MW),
        ));
        Ok(())
    }
}

/// Power-to-heat: draws the electrical setpoint and injects it, scaled by
/// the conversion efficiency, as heat.
pub struct PowerToHeatFormulation;

impl CompoundFormulation for PowerToHeatFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &CompoundCtx<'_>) -> FormResult<()> {
        let eid = ctx.compound.eid();
        let p2h: &PowerToHeat = downcast_compound(ctx, "PowerToHeat")?;
        let power_child = expanded(p2h.power_child(), eid)?;
        let heat_branch = expanded(p2h.heat_branch(), eid)?;

        let setpoint = sys.expr(eid, "p_mw_setpoint")?;
        sys.push(Equation::eq(
            sys.expr(power_child.into(), "p_mw")?,
            setpoint.clone(),
        ));
        sys.push(Equation::eq(
            sys.expr(heat_branch.into(), "q_w")?,
            -(setpoint * p2h.efficiency * W_PER_MW),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble;
    use crate::standard::standard;
    use mf_core::Expr;
    use mf_graph::{ConnectionMap, GasGridParams, Grid, PowerGridParams, WaterGridParams};
    use mf_models::{Bus, ExtHydrGrid, ExtPowerGrid, GasJunction, WaterJunction, WaterPipe};

    #[test]
    fn chp_couples_all_three_carriers() {
        let mut net = Network::new();
        let el = net.add_grid(Grid::power("el", PowerGridParams::default()));
        let gas = net.add_grid(Grid::gas("gas", GasGridParams::default()));
        let water = net.add_grid(Grid::water("heat", WaterGridParams::default()));

        let bus = net.add_node(Box::new(Bus::new(1.0)), Some(el));
        let junction = net.add_node(Box::new(GasJunction::new()), Some(gas));
        let feed = net.add_node(Box::new(WaterJunction::new()), Some(water));
        let ret = net.add_node(Box::new(WaterJunction::new()), Some(water));
        net.add_child(bus, Box::new(ExtPowerGrid::new(0.0, 0.0, 1.0, 0.0)))
            .unwrap();
        net.add_child(junction, Box::new(ExtHydrGrid::new())).unwrap();
        net.add_child(feed, Box::new(ExtHydrGrid::new())).unwrap();
        // Circulation leg keeps feed and return in one heating component.
        net.add_branch(Box::new(WaterPipe::new(0.1, 50.0)), feed, ret, Some(water))
            .unwrap();

        let mut connections = ConnectionMap::new();
        connections.insert("gas", junction);
        connections.insert("power", bus);
        connections.insert("heat", feed);
        connections.insert("heat_return", ret);
        let id = net
            .add_compound(Box::new(Chp::new(0.1, 0.3, 0.5)), connections)
            .unwrap();

        let assembled = assemble(&mut net, &standard(), None).unwrap();
        let chp = net
            .compound(id)
            .unwrap()
            .model
            .as_any()
            .downcast_ref::<Chp>()
            .unwrap();

        // The gas coupling equation holds at mass_flow == -setpoint.
        let mut values = assembled.system.initial_values();
        let gas_flow = assembled
            .system
            .var_id(chp.gas_child().unwrap().into(), "mass_flow")
            .unwrap();
        values[gas_flow] = -0.1;
        let coupling = assembled
            .system
            .equations()
            .iter()
            .find(|eq| eq.lhs == Expr::Var(gas_flow))
            .unwrap();
        assert!(coupling.residual(&values).abs() < 1e-12);
    }

    #[test]
    fn power_to_heat_reports_missing_expansion() {
        let net = Network::new();
        let mut sys = EquationSystem::new();
        let eid = Eid::Compound(mf_core::CompoundId::from_index(0));
        sys.declare(eid, "p_mw_setpoint", mf_core::VarSpec::new(0.5))
            .unwrap();

        let compound = mf_graph::Compound {
            id: mf_core::CompoundId::from_index(0),
            name: None,
            model: Box::new(PowerToHeat::new(0.5, 0.9)),
            connections: ConnectionMap::new(),
            owned: Vec::new(),
            active: true,
        };
        let ctx = CompoundCtx {
            net: &net,
            compound: &compound,
        };
        let err = PowerToHeatFormulation.equations(&mut sys, &ctx).unwrap_err();
        assert!(matches!(err, FormulationError::NotExpanded { .. }));
    }
}
