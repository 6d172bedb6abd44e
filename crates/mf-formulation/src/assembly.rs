//! Solve-time assembly pipeline.

use crate::error::FormResult;
use crate::formulation::{BranchCtx, ChildCtx, CompoundCtx, NetworkFormulation, NodeCtx};
use crate::ignored::{branch_ignored, child_ignored, compound_ignored, find_ignored_nodes, node_ignored};
use mf_core::{EquationSystem, NodeId, StepState};
use mf_graph::{Branch, Child, Network, Node};
use std::collections::HashSet;
use tracing::debug;

/// The assembled system plus the pruning decisions it was built under.
#[derive(Debug)]
pub struct Assembled {
    pub system: EquationSystem,
    pub ignored: HashSet<NodeId>,
}

/// Runs the full assembly pipeline against a working copy of the network.
///
/// The overwrite pass mutates node models (pinning reference quantities to
/// constants), so callers pass a deep copy and keep their original intact.
/// `prev` is the extracted state of the previous timeseries step; `None`
/// disables inter-step couplings.
pub fn assemble(
    net: &mut Network,
    form: &NetworkFormulation,
    prev: Option<&StepState>,
) -> FormResult<Assembled> {
    // Overwrite pass: grid-forming childs pin their node's references.
    let pairs: Vec<_> = net
        .childs()
        .iter()
        .filter(|c| c.active)
        .map(|c| (c.id, c.node_id))
        .collect();
    for (child_id, node_id) in pairs {
        let model = net.child(child_id)?.model.clone();
        let node = net.node_mut(node_id)?;
        model.overwrite(node.model.as_mut());
    }

    let ignored = find_ignored_nodes(net);
    let net: &Network = net;
    let mut sys = EquationSystem::new();

    // Declaration pass.
    for node in net.nodes() {
        if node_ignored(net, node, &ignored) {
            continue;
        }
        let carrier = net.node_carrier(node);
        form.node_for(node, carrier)?.declare(&mut sys, node)?;
    }
    for branch in net.branches() {
        if branch_ignored(net, branch, &ignored) {
            continue;
        }
        let carrier = net.branch_carrier(branch);
        form.branch_for(branch, carrier)?.declare(&mut sys, branch)?;
    }
    for child in net.childs() {
        if child_ignored(net, child, &ignored) {
            continue;
        }
        let carrier = child_carrier(net, child);
        form.child_for(child, carrier)?.declare(&mut sys, child)?;
    }
    for compound in net.compounds() {
        if compound_ignored(net, compound, &ignored) {
            continue;
        }
        form.compound_for(compound)?.declare(&mut sys, compound)?;
    }

    // Extensions declare their auxiliary variables before equations run.
    let extensions = net.extensions().to_vec();
    for extension in &extensions {
        extension.prepare(net, &mut sys, &ignored)?;
    }

    // Equation pass.
    for node in net.nodes() {
        if node_ignored(net, node, &ignored) {
            continue;
        }
        let carrier = net.node_carrier(node);
        let ctx = node_ctx(net, node, &ignored)?;
        form.node_for(node, carrier)?.equations(&mut sys, &ctx)?;
    }
    for branch in net.branches() {
        if branch_ignored(net, branch, &ignored) {
            continue;
        }
        let carrier = net.branch_carrier(branch);
        let ctx = BranchCtx {
            net,
            branch,
            grid: branch.grid.map(|g| net.grid(g)).transpose()?,
            from: net.node(branch.from_node)?,
            to: net.node(branch.to_node)?,
        };
        form.branch_for(branch, carrier)?.equations(&mut sys, &ctx)?;
    }
    for child in net.childs() {
        if child_ignored(net, child, &ignored) {
            continue;
        }
        let carrier = child_carrier(net, child);
        let ctx = ChildCtx {
            net,
            child,
            node: net.node(child.node_id)?,
        };
        form.child_for(child, carrier)?.equations(&mut sys, &ctx)?;
    }
    for compound in net.compounds() {
        if compound_ignored(net, compound, &ignored) {
            continue;
        }
        let ctx = CompoundCtx { net, compound };
        form.compound_for(compound)?.equations(&mut sys, &ctx)?;
    }

    for extension in &extensions {
        extension.equations(net, &mut sys, &ignored)?;
    }

    // Inter-step couplings against the previous step's extracted state.
    if let Some(prev) = prev {
        for node in net.nodes() {
            if !node_ignored(net, node, &ignored) {
                node.model.inter_step_equations(&mut sys, prev, node.eid())?;
            }
        }
        for branch in net.branches() {
            if !branch_ignored(net, branch, &ignored) {
                branch
                    .model
                    .inter_step_equations(&mut sys, prev, branch.eid())?;
            }
        }
        for child in net.childs() {
            if !child_ignored(net, child, &ignored) {
                child.model.inter_step_equations(&mut sys, prev, child.eid())?;
            }
        }
        for compound in net.compounds() {
            if !compound_ignored(net, compound, &ignored) {
                compound
                    .model
                    .inter_step_equations(&mut sys, prev, compound.eid())?;
            }
        }
    }

    debug!(
        vars = sys.num_vars(),
        equations = sys.num_equations(),
        ignored = ignored.len(),
        "assembled network system"
    );

    Ok(Assembled {
        system: sys,
        ignored,
    })
}

fn child_carrier(net: &Network, child: &Child) -> Option<mf_graph::Carrier> {
    net.node(child.node_id)
        .ok()
        .and_then(|n| net.node_carrier(n))
}

fn node_ctx<'a>(
    net: &'a Network,
    node: &'a Node,
    ignored: &HashSet<NodeId>,
) -> FormResult<NodeCtx<'a>> {
    let collect_branches = |ids: &[mf_core::BranchId]| -> FormResult<Vec<&'a Branch>> {
        let mut out = Vec::new();
        for &id in ids {
            let branch = net.branch(id)?;
            if !branch_ignored(net, branch, ignored) {
                out.push(branch);
            }
        }
        Ok(out)
    };

    let mut childs = Vec::new();
    for &id in &node.child_ids {
        let child = net.child(id)?;
        if !child_ignored(net, child, ignored) {
            childs.push(child);
        }
    }

    Ok(NodeCtx {
        net,
        node,
        grid: node.grid.map(|g| net.grid(g)).transpose()?,
        from_branches: collect_branches(&node.from_branch_ids)?,
        to_branches: collect_branches(&node.to_branch_ids)?,
        childs,
    })
}
