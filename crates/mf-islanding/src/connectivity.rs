//! Connectivity flow shared by all carriers.
//!
//! Energization is modelled as a single-commodity flow: every grid-forming
//! node may source flow, every energized node consumes exactly one unit, and
//! flow only passes branches that are switched on. A node can therefore only
//! be energized when a path of closed branches connects it to a live
//! grid-forming node.

use mf_core::{Equation, EquationSystem, Expr, NodeId, SystemResult, VarSpec, sum};
use mf_graph::{Branch, Carrier, Network, Node};
use std::collections::HashSet;
use tracing::warn;

/// Extension variable names for one carrier. Suffixed so one system can
/// carry several carriers side by side.
#[derive(Clone, Copy)]
pub(crate) struct CarrierKeys {
    pub e: &'static str,
    pub c_src: &'static str,
    pub c_fwd: &'static str,
    pub c_rev: &'static str,
}

pub(crate) fn keys(carrier: Carrier) -> CarrierKeys {
    match carrier {
        Carrier::Electricity => CarrierKeys {
            e: "e_el",
            c_src: "c_src_el",
            c_fwd: "c_fwd_el",
            c_rev: "c_rev_el",
        },
        Carrier::Gas => CarrierKeys {
            e: "e_gas",
            c_src: "c_src_gas",
            c_fwd: "c_fwd_gas",
            c_rev: "c_rev_gas",
        },
        Carrier::Water => CarrierKeys {
            e: "e_water",
            c_src: "c_src_water",
            c_fwd: "c_fwd_water",
            c_rev: "c_rev_water",
        },
    }
}

/// Active, non-owned nodes of the carrier that survived pruning.
pub(crate) fn carrier_nodes<'a>(
    net: &'a Network,
    carrier: Carrier,
    ignored: &HashSet<NodeId>,
) -> Vec<&'a Node> {
    net.nodes()
        .iter()
        .filter(|n| {
            n.owner.is_none()
                && n.active
                && !ignored.contains(&n.id)
                && net.node_carrier(n) == Some(carrier)
        })
        .collect()
}

/// Active, non-owned single-carrier branches with both endpoints alive.
pub(crate) fn carrier_branches<'a>(
    net: &'a Network,
    carrier: Carrier,
    ignored: &HashSet<NodeId>,
) -> Vec<&'a Branch> {
    net.branches()
        .iter()
        .filter(|b| {
            b.owner.is_none()
                && b.active
                && !b.model.multi_carrier()
                && net.branch_carrier(b) == Some(carrier)
                && !ignored.contains(&b.from_node)
                && !ignored.contains(&b.to_node)
        })
        .collect()
}

pub(crate) fn is_grid_forming(net: &Network, node: &Node) -> bool {
    node.child_ids.iter().any(|&id| {
        net.child(id)
            .map(|c| c.active && c.model.grid_forming())
            .unwrap_or(false)
    })
}

/// Declares `e` per node, `c_src` per grid-forming node and the directed
/// branch capacities.
pub(crate) fn declare_carrier(
    net: &Network,
    sys: &mut EquationSystem,
    ignored: &HashSet<NodeId>,
    carrier: Carrier,
    big_m: f64,
) -> SystemResult<()> {
    let keys = keys(carrier);
    let nodes = carrier_nodes(net, carrier, ignored);
    if big_m < nodes.len() as f64 {
        warn!(
            carrier = %carrier,
            big_m,
            nodes = nodes.len(),
            "big-M below carrier node count; connectivity flow may be infeasible"
        );
    }

    for node in &nodes {
        sys.declare(node.eid(), keys.e, VarSpec::binary(1.0))?;
        if is_grid_forming(net, node) {
            sys.declare(
                node.eid(),
                keys.c_src,
                VarSpec::new(1.0).with_bounds(0.0, f64::INFINITY),
            )?;
        }
    }
    for branch in carrier_branches(net, carrier, ignored) {
        sys.declare(
            branch.eid(),
            keys.c_fwd,
            VarSpec::new(0.0).with_bounds(0.0, f64::INFINITY),
        )?;
        sys.declare(
            branch.eid(),
            keys.c_rev,
            VarSpec::new(0.0).with_bounds(0.0, f64::INFINITY),
        )?;
    }
    Ok(())
}

fn on_off_expr(sys: &EquationSystem, branch: &Branch) -> Expr {
    sys.expr(branch.eid(), "on_off")
        .unwrap_or(Expr::Const(1.0))
}

/// Emits the carrier's connectivity flow constraints.
pub(crate) fn connectivity_equations(
    net: &Network,
    sys: &mut EquationSystem,
    ignored: &HashSet<NodeId>,
    carrier: Carrier,
    big_m: f64,
) -> SystemResult<()> {
    let keys = keys(carrier);
    let nodes = carrier_nodes(net, carrier, ignored);
    let branches = carrier_branches(net, carrier, ignored);

    // Flow only passes closed branches, bounded by big-M.
    for branch in &branches {
        let cap = big_m * on_off_expr(sys, branch);
        sys.push(Equation::le(sys.expr(branch.eid(), keys.c_fwd)?, cap.clone()));
        sys.push(Equation::le(sys.expr(branch.eid(), keys.c_rev)?, cap));
    }

    let mut e_terms = Vec::new();
    let mut src_terms = Vec::new();
    for node in &nodes {
        let e = sys.expr(node.eid(), keys.e)?;
        e_terms.push(e.clone());

        let mut balance = Vec::new();
        for &id in &node.to_branch_ids {
            let Ok(branch) = net.branch(id) else { continue };
            if sys.is_declared(branch.eid(), keys.c_fwd) {
                balance.push(sys.expr(branch.eid(), keys.c_fwd)?);
                balance.push(-sys.expr(branch.eid(), keys.c_rev)?);
            }
        }
        for &id in &node.from_branch_ids {
            let Ok(branch) = net.branch(id) else { continue };
            if sys.is_declared(branch.eid(), keys.c_fwd) {
                balance.push(sys.expr(branch.eid(), keys.c_rev)?);
                balance.push(-sys.expr(branch.eid(), keys.c_fwd)?);
            }
        }

        if is_grid_forming(net, node) {
            // Grid-forming nodes stay energized and may source flow.
            sys.push(Equation::eq(e.clone(), Expr::Const(1.0)));
            let c_src = sys.expr(node.eid(), keys.c_src)?;
            sys.push(Equation::le(c_src.clone(), Expr::Const(big_m)));
            balance.push(c_src);
        }
        sys.push(Equation::eq(sum(balance), e));
    }

    // Sourced flow exactly covers the energized nodes.
    if !nodes.is_empty() {
        let src: Vec<Expr> = nodes
            .iter()
            .filter(|n| is_grid_forming(net, n))
            .map(|n| sys.expr(n.eid(), keys.c_src))
            .collect::<SystemResult<_>>()?;
        src_terms.extend(src);
        sys.push(Equation::eq(sum(src_terms), sum(e_terms)));
    }
    Ok(())
}
