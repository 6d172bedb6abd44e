//! Cross-carrier transfer branch.

use super::downcast_branch;
use crate::error::FormResult;
use crate::formulation::{BranchCtx, BranchFormulation};
use mf_core::{Equation, EquationSystem};
use mf_models::TransferBranch;

/// Lossless antisymmetric transfer: whatever leaves one end arrives at the
/// other. The shared mass flow variable needs no equation of its own; both
/// endpoint balances reference the same attribute.
pub struct TransferBranchFormulation;

impl BranchFormulation for TransferBranchFormulation {
    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()> {
        let eid = ctx.branch.eid();
        downcast_branch::<TransferBranch>(ctx.branch, "TransferBranch")?;

        sys.push(Equation::eq(
            sys.expr(eid, "p_to_mw")?,
            -sys.expr(eid, "p_from_mw")?,
        ));
        sys.push(Equation::eq(
            sys.expr(eid, "q_to_mvar")?,
            -sys.expr(eid, "q_from_mvar")?,
        ));
        Ok(())
    }
}
