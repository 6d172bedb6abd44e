//! Per-carrier topology queries.
//!
//! The ignored-node analysis and the islanding layer both reason about
//! connectivity within a single carrier: compound-owned components and
//! multi-carrier branches are excluded, so compound internals never leak
//! into carrier subgraphs.

use crate::grid::Carrier;
use crate::network::Network;
use mf_core::NodeId;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Which branches form edges of the carrier subgraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyMode {
    /// Only enabled branches (active and not constant-off). Used for the
    /// default ignored-node analysis.
    Enabled,
    /// Every branch of the carrier regardless of switching state. Used when
    /// an islanding extension decides energization itself.
    Complete,
}

/// Connected components of one carrier's subgraph, as lists of node ids.
///
/// Nodes belong to the subgraph when they carry the requested carrier's
/// grid and are not compound-owned; activity is judged by the caller's
/// ignore rules, not here.
pub fn carrier_components(net: &Network, carrier: Carrier, mode: TopologyMode) -> Vec<Vec<NodeId>> {
    let mut uf = UnionFind::new(net.nodes().len());

    for branch in net.branches() {
        if branch.owner.is_some() || branch.model.multi_carrier() {
            continue;
        }
        if net.branch_carrier(branch) != Some(carrier) {
            continue;
        }
        if mode == TopologyMode::Enabled && !branch.enabled() {
            continue;
        }
        uf.union(branch.from_node.index(), branch.to_node.index());
    }

    let mut groups: HashMap<usize, Vec<NodeId>> = HashMap::new();
    for node in net.nodes() {
        if node.owner.is_some() || net.node_carrier(node) != Some(carrier) {
            continue;
        }
        groups
            .entry(uf.find(node.id.index()))
            .or_default()
            .push(node.id);
    }

    let mut components: Vec<Vec<NodeId>> = groups.into_values().collect();
    components.sort_by_key(|c| c.first().copied());
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, PowerGridParams};
    use crate::model::{BranchModel, NodeModel};
    use crate::model_common;
    use mf_core::{Attr, impl_var_set};

    #[derive(Clone, Debug)]
    struct N {
        v: Attr,
    }
    impl_var_set!(N { v });
    model_common!(N);
    impl NodeModel for N {
        fn clone_node(&self) -> Box<dyn NodeModel> {
            Box::new(self.clone())
        }
    }

    #[derive(Clone, Debug)]
    struct B {
        on_off: Attr,
    }
    impl_var_set!(B { on_off });
    model_common!(B);
    impl BranchModel for B {
        fn clone_branch(&self) -> Box<dyn BranchModel> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn disabled_branch_splits_in_enabled_mode_only() {
        let mut net = Network::new();
        let g = net.add_grid(Grid::power("el", PowerGridParams::default()));
        let a = net.add_node(Box::new(N { v: Attr::var(0.0) }), Some(g));
        let b = net.add_node(Box::new(N { v: Attr::var(0.0) }), Some(g));
        net.add_branch(Box::new(B { on_off: Attr::con(0.0) }), a, b, Some(g))
            .unwrap();

        let enabled = carrier_components(&net, Carrier::Electricity, TopologyMode::Enabled);
        assert_eq!(enabled.len(), 2);

        let complete = carrier_components(&net, Carrier::Electricity, TopologyMode::Complete);
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0], vec![a, b]);
    }
}
