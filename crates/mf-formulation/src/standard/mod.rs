//! The standard formulation set: AC power flow, gas and water hydraulics,
//! transfer branches and compound couplings.

mod compounds;
mod el;
mod gas;
mod transfer;
mod water;

pub use compounds::{ChpFormulation, PowerToHeatFormulation};
pub use el::{AcBusFormulation, PowerLineFormulation};
pub use gas::{GasJunctionFormulation, GasPipeFormulation};
pub use transfer::TransferBranchFormulation;
pub use water::{HeatExchangerFormulation, WaterJunctionFormulation, WaterPipeFormulation};

use crate::error::{FormResult, FormulationError};
use crate::formulation::{ChildFormulation, NetworkFormulation, NodeCtx};
use mf_core::{EquationSystem, Expr, sum};
use mf_graph::{Branch, Carrier, Node};
use mf_models::{
    Bus, Chp, CouplingFlow, CouplingPower, ExtHydrGrid, ExtPowerGrid, GasJunction, GasPipe,
    GridFormingGenerator, GridFormingSource, HeatExchanger, PowerGenerator, PowerLine, PowerLoad,
    PowerToHeat, RampGenerator, Sink, Source, TransferBranch, WaterJunction, WaterPipe,
};

/// Childs that only contribute terms to their node's balance.
pub struct PassiveChildFormulation;

impl ChildFormulation for PassiveChildFormulation {}

/// The full registry for the bundled model library.
pub fn standard() -> NetworkFormulation {
    let mut form = NetworkFormulation::new();

    form.register_node::<Bus>(Some(Carrier::Electricity), AcBusFormulation)
        .register_node::<GasJunction>(Some(Carrier::Gas), GasJunctionFormulation)
        .register_node::<WaterJunction>(Some(Carrier::Water), WaterJunctionFormulation);

    form.register_branch::<PowerLine>(Some(Carrier::Electricity), PowerLineFormulation)
        .register_branch::<GasPipe>(Some(Carrier::Gas), GasPipeFormulation)
        .register_branch::<WaterPipe>(Some(Carrier::Water), WaterPipeFormulation)
        .register_branch::<HeatExchanger>(Some(Carrier::Water), HeatExchangerFormulation)
        .register_branch::<TransferBranch>(None, TransferBranchFormulation);

    form.register_child::<PowerLoad>(None, PassiveChildFormulation)
        .register_child::<PowerGenerator>(None, PassiveChildFormulation)
        .register_child::<ExtPowerGrid>(None, PassiveChildFormulation)
        .register_child::<Sink>(None, PassiveChildFormulation)
        .register_child::<Source>(None, PassiveChildFormulation)
        .register_child::<ExtHydrGrid>(None, PassiveChildFormulation)
        .register_child::<GridFormingGenerator>(None, PassiveChildFormulation)
        .register_child::<GridFormingSource>(None, PassiveChildFormulation)
        .register_child::<CouplingFlow>(None, PassiveChildFormulation)
        .register_child::<CouplingPower>(None, PassiveChildFormulation)
        .register_child::<RampGenerator>(None, PassiveChildFormulation);

    form.register_compound::<Chp>(None, ChpFormulation)
        .register_compound::<PowerToHeat>(None, PowerToHeatFormulation);

    form
}

pub(crate) fn downcast_node<'a, M: 'static>(
    node: &'a Node,
    expected: &'static str,
) -> FormResult<&'a M> {
    node.model
        .as_any()
        .downcast_ref::<M>()
        .ok_or(FormulationError::ModelMismatch {
            eid: node.eid(),
            expected,
        })
}

pub(crate) fn downcast_branch<'a, M: 'static>(
    branch: &'a Branch,
    expected: &'static str,
) -> FormResult<&'a M> {
    branch
        .model
        .as_any()
        .downcast_ref::<M>()
        .ok_or(FormulationError::ModelMismatch {
            eid: branch.eid(),
            expected,
        })
}

/// Sum of one directional attribute over the incident branches that carry
/// it: `from_attr` over outgoing, `to_attr` over incoming branches.
pub(crate) fn branch_attr_sum(
    sys: &EquationSystem,
    ctx: &NodeCtx<'_>,
    from_attr: &'static str,
    to_attr: &'static str,
) -> FormResult<Expr> {
    let mut terms = Vec::new();
    for branch in &ctx.from_branches {
        if branch.model.has_attr(from_attr) {
            terms.push(sys.expr(branch.eid(), from_attr)?);
        }
    }
    for branch in &ctx.to_branches {
        if branch.model.has_attr(to_attr) {
            terms.push(sys.expr(branch.eid(), to_attr)?);
        }
    }
    Ok(sum(terms))
}

/// Regulation-scaled sum of a child attribute over the attached childs that
/// carry it.
pub(crate) fn child_contribution(
    sys: &EquationSystem,
    ctx: &NodeCtx<'_>,
    attr: &'static str,
) -> FormResult<Expr> {
    let mut terms = Vec::new();
    for child in &ctx.childs {
        if !child.model.has_attr(attr) {
            continue;
        }
        let value = sys.expr(child.eid(), attr)?;
        let regulation = if child.model.has_attr("regulation") {
            sys.expr(child.eid(), "regulation")?
        } else {
            Expr::Const(1.0)
        };
        terms.push(value * regulation);
    }
    Ok(sum(terms))
}

/// Signed mass flow into the node: outgoing branches withdraw, incoming
/// branches deliver.
pub(crate) fn signed_mass_sum(sys: &EquationSystem, ctx: &NodeCtx<'_>) -> FormResult<Expr> {
    let mut terms = Vec::new();
    for branch in &ctx.from_branches {
        if branch.model.has_attr("mass_flow") {
            terms.push(-sys.expr(branch.eid(), "mass_flow")?);
        }
    }
    for branch in &ctx.to_branches {
        if branch.model.has_attr("mass_flow") {
            terms.push(sys.expr(branch.eid(), "mass_flow")?);
        }
    }
    Ok(sum(terms))
}
