//! Electrical formulations: AC bus balances and line flows.

use super::{branch_attr_sum, child_contribution, downcast_branch, downcast_node};
use crate::error::{FormResult, FormulationError};
use crate::formulation::{BranchCtx, BranchFormulation, NodeCtx, NodeFormulation};
use crate::phys::ac_flow;
use mf_core::{Equation, EquationSystem, Expr};
use mf_models::{Bus, PowerLine};

/// AC bus: the node's `p_mw`/`q_mvar` collect the incident branch flows, and
/// the attached childs must balance them.
pub struct AcBusFormulation;

impl NodeFormulation for AcBusFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &NodeCtx<'_>) -> FormResult<()> {
        let eid = ctx.node.eid();

        let p = sys.expr(eid, "p_mw")?;
        let q = sys.expr(eid, "q_mvar")?;
        let p_branches = branch_attr_sum(sys, ctx, "p_from_mw", "p_to_mw")?;
        let q_branches = branch_attr_sum(sys, ctx, "q_from_mvar", "q_to_mvar")?;
        sys.push(Equation::eq(p.clone(), p_branches));
        sys.push(Equation::eq(q.clone(), q_branches));

        // Childs store consumption as positive, so the net injection they
        // leave behind cancels the branch withdrawal.
        let p_childs = child_contribution(sys, ctx, "p_mw")?;
        let q_childs = child_contribution(sys, ctx, "q_mvar")?;
        sys.push(Equation::eq(p + p_childs, Expr::Const(0.0)));
        sys.push(Equation::eq(q + q_childs, Expr::Const(0.0)));
        Ok(())
    }
}

/// AC line in per-unit: per-length impedance becomes series admittance using
/// the from-bus base voltage and the grid base power, and the four directed
/// flows follow the polar power flow equations.
pub struct PowerLineFormulation;

impl BranchFormulation for PowerLineFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()> {
        let eid = ctx.branch.eid();
        let line: &PowerLine = downcast_branch(ctx.branch, "PowerLine")?;
        let bus: &Bus = downcast_node(ctx.from, "Bus")?;
        let sn_mva = ctx
            .grid
            .and_then(|g| g.as_power())
            .ok_or(FormulationError::GridMismatch {
                eid,
                expected: "power",
            })?
            .sn_mva;

        let base_r = bus.base_kv * bus.base_kv / sn_mva;
        let r_pu = line.r_ohm_per_m * line.length_m / base_r / line.parallel;
        let x_pu = line.x_ohm_per_m * line.length_m / base_r / line.parallel;
        let denom = r_pu * r_pu + x_pu * x_pu;
        if denom <= 0.0 {
            return Err(FormulationError::InvalidParameter {
                eid,
                what: "line impedance must be nonzero",
            });
        }
        let g = r_pu / denom;
        let b = -x_pu / denom;

        let flow = ac_flow(
            g,
            b,
            1.0,
            0.0,
            sys.expr(ctx.from.eid(), "vm_pu")?,
            sys.expr(ctx.from.eid(), "va_rad")?,
            sys.expr(ctx.to.eid(), "vm_pu")?,
            sys.expr(ctx.to.eid(), "va_rad")?,
        );

        let on = sys.expr(eid, "on_off")?;
        sys.push(Equation::eq(
            sys.expr(eid, "p_from_mw")?,
            sn_mva * on.clone() * flow.p_from,
        ));
        sys.push(Equation::eq(
            sys.expr(eid, "q_from_mvar")?,
            sn_mva * on.clone() * flow.q_from,
        ));
        sys.push(Equation::eq(
            sys.expr(eid, "p_to_mw")?,
            sn_mva * on.clone() * flow.p_to,
        ));
        sys.push(Equation::eq(
            sys.expr(eid, "q_to_mvar")?,
            sn_mva * on * flow.q_to,
        ));
        Ok(())
    }
}
