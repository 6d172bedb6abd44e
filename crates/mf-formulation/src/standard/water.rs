//! Heating-water formulations: junction mass and heat balances, insulated
//! pipes with temperature transport, and heat exchangers.

use super::{child_contribution, downcast_branch, signed_mass_sum};
use crate::error::{FormResult, FormulationError};
use crate::formulation::{BranchCtx, BranchFormulation, NodeCtx, NodeFormulation};
use crate::phys::{
    darcy_coefficient, friction_expr, heat_loss_coefficient, nikuradse_friction, pipe_area,
    reynolds_expr,
};
use mf_core::{Equation, EquationSystem, Expr, sum};
use mf_models::{HeatExchanger, WATER_HEAT_CAPACITY, WaterPipe};

/// Water junction: mass balance plus an enthalpy balance at the mixed node
/// temperature. Branch endpoints carry their own temperatures; childs inject
/// or withdraw at the node temperature.
pub struct WaterJunctionFormulation;

impl NodeFormulation for WaterJunctionFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &NodeCtx<'_>) -> FormResult<()> {
        let eid = ctx.node.eid();

        let branches = signed_mass_sum(sys, ctx)?;
        let childs = child_contribution(sys, ctx, "mass_flow")?;
        sys.push(Equation::eq(branches + childs, Expr::Const(0.0)));

        let c = WATER_HEAT_CAPACITY;
        let t_node = sys.expr(eid, "t_k")?;
        let mut heat = Vec::new();
        for branch in &ctx.from_branches {
            if branch.model.has_attr("t_from_k") {
                let flow = sys.expr(branch.eid(), "mass_flow")?;
                let t = sys.expr(branch.eid(), "t_from_k")?;
                heat.push(-(flow * t * c));
            }
        }
        for branch in &ctx.to_branches {
            if branch.model.has_attr("t_to_k") {
                let flow = sys.expr(branch.eid(), "mass_flow")?;
                let t = sys.expr(branch.eid(), "t_to_k")?;
                heat.push(flow * t * c);
            }
        }
        let child_mass = child_contribution(sys, ctx, "mass_flow")?;
        heat.push(child_mass * t_node * c);
        sys.push(Equation::eq(sum(heat), Expr::Const(0.0)));
        Ok(())
    }
}

/// Insulated water pipe: Darcy-Weisbach hydraulics, conductive heat loss to
/// the environment and enthalpy transport between its endpoint temperatures.
pub struct WaterPipeFormulation;

impl BranchFormulation for WaterPipeFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()> {
        let eid = ctx.branch.eid();
        let pipe: &WaterPipe = downcast_branch(ctx.branch, "WaterPipe")?;
        let water = ctx
            .grid
            .and_then(|g| g.as_water())
            .ok_or(FormulationError::GridMismatch {
                eid,
                expected: "water",
            })?;

        let area = pipe_area(pipe.diameter_m);
        let nikuradse = nikuradse_friction(pipe.diameter_m, pipe.roughness_m);
        let darcy = darcy_coefficient(
            pipe.length_m,
            pipe.diameter_m,
            water.density_kg_per_m3,
            water.pressure_ref_pa,
        );
        let heat_loss = heat_loss_coefficient(
            pipe.insulation_w_per_mk,
            pipe.length_m,
            pipe.diameter_m,
            pipe.insulation_thickness_m,
        );

        let flow = sys.expr(eid, "mass_flow")?;
        let reynolds = sys.expr(eid, "reynolds")?;
        sys.push(Equation::eq(
            reynolds.clone(),
            reynolds_expr(flow.clone(), pipe.diameter_m, water.dynamic_visc_pa_s, area),
        ));

        // Pressure drops along positive flow.
        let p_from = sys.expr(ctx.from.eid(), "pressure_pu")?;
        let p_to = sys.expr(ctx.to.eid(), "pressure_pu")?;
        let on = sys.expr(eid, "on_off")?;
        sys.push(Equation::eq(
            on * (p_from - p_to),
            friction_expr(reynolds, nikuradse) * darcy * flow.clone().abs() * flow.clone(),
        ));

        let q_w = sys.expr(eid, "q_w")?;
        let t_average = sys.expr(eid, "t_average_k")?;
        let t_from = sys.expr(eid, "t_from_k")?;
        let t_to = sys.expr(eid, "t_to_k")?;
        sys.push(Equation::eq(
            q_w.clone(),
            heat_loss * (t_average.clone() - pipe.ext_t_k),
        ));
        sys.push(Equation::eq(
            q_w,
            flow * WATER_HEAT_CAPACITY * (t_from.clone() - t_to.clone()),
        ));
        sys.push(Equation::eq(
            t_average,
            (t_from.clone() + t_to.clone()) * 0.5,
        ));
        sys.push(Equation::eq(t_from, sys.expr(ctx.from.eid(), "t_k")?));
        sys.push(Equation::eq(t_to, sys.expr(ctx.to.eid(), "t_k")?));
        Ok(())
    }
}

/// Heat exchanger: no pressure drop, endpoint temperatures alias the nodes,
/// and `q_w` is the enthalpy difference it imposes.
pub struct HeatExchangerFormulation;

impl BranchFormulation for HeatExchangerFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()> {
        let eid = ctx.branch.eid();
        downcast_branch::<HeatExchanger>(ctx.branch, "HeatExchanger")?;

        sys.push(Equation::eq(
            sys.expr(ctx.from.eid(), "pressure_pu")?,
            sys.expr(ctx.to.eid(), "pressure_pu")?,
        ));

        let t_from = sys.expr(eid, "t_from_k")?;
        let t_to = sys.expr(eid, "t_to_k")?;
        sys.push(Equation::eq(
            t_from.clone(),
            sys.expr(ctx.from.eid(), "t_k")?,
        ));
        sys.push(Equation::eq(t_to.clone(), sys.expr(ctx.to.eid(), "t_k")?));

        let flow = sys.expr(eid, "mass_flow")?;
        sys.push(Equation::eq(
            sys.expr(eid, "q_w")?,
            flow * WATER_HEAT_CAPACITY * (t_from - t_to),
        ));
        Ok(())
    }
}
