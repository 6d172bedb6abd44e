//! Graph-walk reachability, independent of the solver.
//!
//! Useful for validating a candidate switching state: a node that the flow
//! constraints allow to be energized is exactly a node reachable from a
//! grid-forming node over closed branches.

use crate::connectivity::is_grid_forming;
use mf_core::NodeId;
use mf_graph::{Carrier, Network};
use std::collections::{HashSet, VecDeque};

/// Nodes of the carrier reachable from an active grid-forming child over
/// enabled branches.
pub fn reachable_nodes(net: &Network, carrier: Carrier) -> HashSet<NodeId> {
    let mut reached = HashSet::new();
    let mut queue = VecDeque::new();

    for node in net.nodes() {
        if node.owner.is_none()
            && node.active
            && net.node_carrier(node) == Some(carrier)
            && is_grid_forming(net, node)
        {
            reached.insert(node.id);
            queue.push_back(node.id);
        }
    }

    while let Some(id) = queue.pop_front() {
        let Ok(node) = net.node(id) else { continue };
        let incident = node.from_branch_ids.iter().chain(&node.to_branch_ids);
        for &branch_id in incident {
            let Ok(branch) = net.branch(branch_id) else {
                continue;
            };
            if branch.owner.is_some()
                || branch.model.multi_carrier()
                || net.branch_carrier(branch) != Some(carrier)
                || !branch.enabled()
            {
                continue;
            }
            let other = if branch.from_node == id {
                branch.to_node
            } else {
                branch.from_node
            };
            let is_active = net.node(other).map(|n| n.active).unwrap_or(false);
            if is_active && reached.insert(other) {
                queue.push_back(other);
            }
        }
    }
    reached
}
