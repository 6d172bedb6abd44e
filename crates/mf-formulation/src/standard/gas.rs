//! Gas formulations: junction mass balance and Weymouth pipe flow.

use super::{child_contribution, downcast_branch, signed_mass_sum};
use crate::error::{FormResult, FormulationError};
use crate::formulation::{BranchCtx, BranchFormulation, NodeCtx, NodeFormulation};
use crate::phys::{
    friction_expr, nikuradse_friction, pipe_area, reynolds_expr, sound_speed_sq,
    weymouth_coefficient,
};
use mf_core::{Equation, EquationSystem, Expr};
use mf_models::GasPipe;

/// Gas junction: signed pipe flows plus child injections sum to zero.
pub struct GasJunctionFormulation;

impl NodeFormulation for GasJunctionFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &NodeCtx<'_>) -> FormResult<()> {
        let branches = signed_mass_sum(sys, ctx)?;
        let childs = child_contribution(sys, ctx, "mass_flow")?;
        sys.push(Equation::eq(branches + childs, Expr::Const(0.0)));
        Ok(())
    }
}

/// Isothermal Weymouth-type pipe: the per-unit pressure difference balances
/// the friction pressure loss, quadratic in the mass flow. The friction
/// factor blends a laminar term with the Nikuradse rough-pipe limit so the
/// relation stays smooth through zero flow.
pub struct GasPipeFormulation;

impl BranchFormulation for GasPipeFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()> {
        let eid = ctx.branch.eid();
        let pipe: &GasPipe = downcast_branch(ctx.branch, "GasPipe")?;
        let gas = ctx
            .grid
            .and_then(|g| g.as_gas())
            .ok_or(FormulationError::GridMismatch {
                eid,
                expected: "gas",
            })?;

        let area = pipe_area(pipe.diameter_m);
        let a_sq = sound_speed_sq(
            gas.compressibility,
            gas.temperature_k,
            gas.molar_mass_kg_per_mol,
        );
        let w = weymouth_coefficient(
            pipe.length_m,
            pipe.diameter_m,
            area,
            a_sq,
            gas.pressure_ref_pa,
        );
        let nikuradse = nikuradse_friction(pipe.diameter_m, pipe.roughness_m);

        let flow = sys.expr(eid, "mass_flow")?;
        let reynolds = reynolds_expr(flow.clone(), pipe.diameter_m, gas.dynamic_visc_pa_s, area);
        let friction = friction_expr(reynolds, nikuradse);

        let p_from = sys.expr(ctx.from.eid(), "pressure_pu")?;
        let p_to = sys.expr(ctx.to.eid(), "pressure_pu")?;
        let on = sys.expr(eid, "on_off")?;
        sys.push(Equation::eq(
            on * (p_from - p_to),
            friction * w * flow.clone().abs() * flow,
        ));
        Ok(())
    }
}
