//! Ignored-node analysis.
//!
//! A connected component with no active grid-forming child has no reference
//! quantity and no slack, so its equations would be unsolvable; such
//! components are pruned from the system. Per carrier the analysis runs on
//! the enabled-branch topology, unless an extension manages islanding for
//! the carrier, in which case the complete topology is used and energization
//! becomes a solver decision.

use mf_core::NodeId;
use mf_graph::{Branch, Carrier, Child, Compound, Network, Node, TopologyMode, carrier_components};
use std::collections::HashSet;

pub fn find_ignored_nodes(net: &Network) -> HashSet<NodeId> {
    let mut ignored = HashSet::new();
    for carrier in Carrier::ALL {
        let mode = if net.islanding_active(carrier) {
            TopologyMode::Complete
        } else {
            TopologyMode::Enabled
        };
        for component in carrier_components(net, carrier, mode) {
            let keep = component.iter().any(|&node_id| {
                let Ok(node) = net.node(node_id) else {
                    return false;
                };
                node.active
                    && node.child_ids.iter().any(|&child_id| {
                        net.child(child_id)
                            .map(|c| c.active && c.model.grid_forming())
                            .unwrap_or(false)
                    })
            });
            if !keep {
                ignored.extend(component);
            }
        }
    }
    ignored
}

/// A compound is ignored when inactive or when any connected node dropped
/// out of the system.
pub fn compound_ignored(net: &Network, compound: &Compound, ignored: &HashSet<NodeId>) -> bool {
    if !compound.active {
        return true;
    }
    compound.connections.values().any(|&node_id| {
        net.node(node_id)
            .map(|n| !n.active || ignored.contains(&node_id))
            .unwrap_or(true)
    })
}

pub fn node_ignored(net: &Network, node: &Node, ignored: &HashSet<NodeId>) -> bool {
    if !node.active || ignored.contains(&node.id) {
        return true;
    }
    if let Some(owner) = node.owner {
        return net
            .compound(owner)
            .map(|c| compound_ignored(net, c, ignored))
            .unwrap_or(true);
    }
    false
}

pub fn branch_ignored(net: &Network, branch: &Branch, ignored: &HashSet<NodeId>) -> bool {
    if !branch.active {
        return true;
    }
    if let Some(owner) = branch.owner {
        if net
            .compound(owner)
            .map(|c| compound_ignored(net, c, ignored))
            .unwrap_or(true)
        {
            return true;
        }
    }
    let endpoints_ignored = [branch.from_node, branch.to_node].into_iter().any(|id| {
        net.node(id)
            .map(|n| node_ignored(net, n, ignored))
            .unwrap_or(true)
    });
    endpoints_ignored
}

pub fn child_ignored(net: &Network, child: &Child, ignored: &HashSet<NodeId>) -> bool {
    if !child.active {
        return true;
    }
    if let Some(owner) = child.owner {
        if net
            .compound(owner)
            .map(|c| compound_ignored(net, c, ignored))
            .unwrap_or(true)
        {
            return true;
        }
    }
    net.node(child.node_id)
        .map(|n| node_ignored(net, n, ignored))
        .unwrap_or(true)
}
