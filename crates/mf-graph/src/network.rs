//! The network container.

use crate::error::{NetworkError, NetworkResult};
use crate::extension::NetworkExtension;
use crate::grid::{Carrier, Grid};
use crate::model::{BranchModel, ChildModel, CompoundModel, ConnectionMap, NodeModel};
use mf_core::{Attr, BranchId, ChildId, CompoundId, Eid, GridId, NodeId};
use std::sync::Arc;

/// A node: connection point within one grid, or a carrier-free coupling
/// point when `grid` is None.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub model: Box<dyn NodeModel>,
    pub grid: Option<GridId>,
    pub active: bool,
    /// Set when the node was created by a compound's expansion.
    pub owner: Option<CompoundId>,
    pub child_ids: Vec<ChildId>,
    pub from_branch_ids: Vec<BranchId>,
    pub to_branch_ids: Vec<BranchId>,
}

impl Node {
    pub fn eid(&self) -> Eid {
        Eid::Node(self.id)
    }
}

/// A directed branch between two nodes.
#[derive(Clone, Debug)]
pub struct Branch {
    pub id: BranchId,
    pub name: Option<String>,
    pub model: Box<dyn BranchModel>,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub grid: Option<GridId>,
    pub active: bool,
    pub owner: Option<CompoundId>,
}

impl Branch {
    pub fn eid(&self) -> Eid {
        Eid::Branch(self.id)
    }

    /// Whether the branch participates in the enabled-branch topology:
    /// active, and not switched off through a constant `on_off` attribute.
    /// A variable `on_off` counts as enabled since the solver may close it.
    pub fn enabled(&self) -> bool {
        if !self.active {
            return false;
        }
        match self.model.attr("on_off") {
            Some(Attr::Const(v)) => v != 0.0,
            _ => true,
        }
    }
}

/// A child: injection or withdrawal attached to a node.
#[derive(Clone, Debug)]
pub struct Child {
    pub id: ChildId,
    pub name: Option<String>,
    pub model: Box<dyn ChildModel>,
    pub node_id: NodeId,
    pub active: bool,
    pub owner: Option<CompoundId>,
}

impl Child {
    pub fn eid(&self) -> Eid {
        Eid::Child(self.id)
    }
}

/// A compound: a coupling unit spanning one or more carriers, expanded into
/// owned sub-components at registration.
#[derive(Clone, Debug)]
pub struct Compound {
    pub id: CompoundId,
    pub name: Option<String>,
    pub model: Box<dyn CompoundModel>,
    pub connections: ConnectionMap,
    pub owned: Vec<Eid>,
    pub active: bool,
}

impl Compound {
    pub fn eid(&self) -> Eid {
        Eid::Compound(self.id)
    }
}

/// The multi-energy network: grids, components and registered extensions.
///
/// Component ids are dense and monotonically increasing; components are
/// deactivated rather than removed, so ids stay stable for the lifetime of
/// the network and across deep copies.
#[derive(Clone, Debug, Default)]
pub struct Network {
    grids: Vec<Grid>,
    nodes: Vec<Node>,
    branches: Vec<Branch>,
    childs: Vec<Child>,
    compounds: Vec<Compound>,
    extensions: Vec<Arc<dyn NetworkExtension>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_grid(&mut self, grid: Grid) -> GridId {
        let id = GridId::from_index(self.grids.len());
        self.grids.push(grid);
        id
    }

    pub fn add_node(&mut self, model: Box<dyn NodeModel>, grid: Option<GridId>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: None,
            model,
            grid,
            active: true,
            owner: None,
            child_ids: Vec::new(),
            from_branch_ids: Vec::new(),
            to_branch_ids: Vec::new(),
        });
        id
    }

    pub fn add_branch(
        &mut self,
        model: Box<dyn BranchModel>,
        from_node: NodeId,
        to_node: NodeId,
        grid: Option<GridId>,
    ) -> NetworkResult<BranchId> {
        if from_node.index() >= self.nodes.len() {
            return Err(NetworkError::UnknownNode(from_node));
        }
        if to_node.index() >= self.nodes.len() {
            return Err(NetworkError::UnknownNode(to_node));
        }
        let id = BranchId::from_index(self.branches.len());
        self.branches.push(Branch {
            id,
            name: None,
            model,
            from_node,
            to_node,
            grid,
            active: true,
            owner: None,
        });
        self.nodes[from_node.index()].from_branch_ids.push(id);
        self.nodes[to_node.index()].to_branch_ids.push(id);
        Ok(id)
    }

    pub fn add_child(
        &mut self,
        node_id: NodeId,
        model: Box<dyn ChildModel>,
    ) -> NetworkResult<ChildId> {
        if node_id.index() >= self.nodes.len() {
            return Err(NetworkError::UnknownNode(node_id));
        }
        let id = ChildId::from_index(self.childs.len());
        self.childs.push(Child {
            id,
            name: None,
            model,
            node_id,
            active: true,
            owner: None,
        });
        self.nodes[node_id.index()].child_ids.push(id);
        Ok(id)
    }

    /// Registers a compound: validates the connection wiring against the
    /// model's declared roles, runs the expansion and marks every created
    /// component as owned.
    pub fn add_compound(
        &mut self,
        mut model: Box<dyn CompoundModel>,
        connections: ConnectionMap,
    ) -> NetworkResult<CompoundId> {
        for &(role, expected) in model.connection_roles() {
            let node_id = *connections
                .get(role)
                .ok_or(NetworkError::MissingConnection { role })?;
            let node = self.node(node_id)?;
            let found = node.grid.and_then(|g| self.grids.get(g.index())).map(Grid::carrier);
            if found != Some(expected) {
                return Err(NetworkError::ConnectionCarrierMismatch {
                    role,
                    expected,
                    node: node_id,
                    found,
                });
            }
        }

        let id = CompoundId::from_index(self.compounds.len());
        let owned = model.expand(self, &connections)?;
        for &eid in &owned {
            match eid {
                Eid::Node(n) => self.node_mut(n)?.owner = Some(id),
                Eid::Branch(b) => self.branch_mut(b)?.owner = Some(id),
                Eid::Child(c) => self.child_mut(c)?.owner = Some(id),
                Eid::Compound(c) => return Err(NetworkError::UnknownCompound(c)),
            }
        }
        self.compounds.push(Compound {
            id,
            name: None,
            model,
            connections,
            owned,
            active: true,
        });
        Ok(id)
    }

    pub fn add_extension(&mut self, ext: Arc<dyn NetworkExtension>) {
        self.extensions.push(ext);
    }

    pub fn extensions(&self) -> &[Arc<dyn NetworkExtension>] {
        &self.extensions
    }

    /// Whether any registered extension manages islanding for the carrier.
    pub fn islanding_active(&self, carrier: Carrier) -> bool {
        self.extensions.iter().any(|e| e.manages_islanding(carrier))
    }

    pub fn grid(&self, id: GridId) -> NetworkResult<&Grid> {
        self.grids.get(id.index()).ok_or(NetworkError::UnknownGrid(id))
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn node(&self, id: NodeId) -> NetworkResult<&Node> {
        self.nodes.get(id.index()).ok_or(NetworkError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownNode(id))
    }

    pub fn branch(&self, id: BranchId) -> NetworkResult<&Branch> {
        self.branches
            .get(id.index())
            .ok_or(NetworkError::UnknownBranch(id))
    }

    pub fn branch_mut(&mut self, id: BranchId) -> NetworkResult<&mut Branch> {
        self.branches
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownBranch(id))
    }

    pub fn child(&self, id: ChildId) -> NetworkResult<&Child> {
        self.childs
            .get(id.index())
            .ok_or(NetworkError::UnknownChild(id))
    }

    pub fn child_mut(&mut self, id: ChildId) -> NetworkResult<&mut Child> {
        self.childs
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownChild(id))
    }

    pub fn compound(&self, id: CompoundId) -> NetworkResult<&Compound> {
        self.compounds
            .get(id.index())
            .ok_or(NetworkError::UnknownCompound(id))
    }

    pub fn compound_mut(&mut self, id: CompoundId) -> NetworkResult<&mut Compound> {
        self.compounds
            .get_mut(id.index())
            .ok_or(NetworkError::UnknownCompound(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn childs(&self) -> &[Child] {
        &self.childs
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.as_deref() == Some(name))
    }

    pub fn branch_by_name(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name.as_deref() == Some(name))
    }

    pub fn child_by_name(&self, name: &str) -> Option<&Child> {
        self.childs.iter().find(|c| c.name.as_deref() == Some(name))
    }

    pub fn compound_by_name(&self, name: &str) -> Option<&Compound> {
        self.compounds
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }

    /// Carrier of a node, None for carrier-free nodes.
    pub fn node_carrier(&self, node: &Node) -> Option<Carrier> {
        node.grid
            .and_then(|g| self.grids.get(g.index()))
            .map(Grid::carrier)
    }

    /// Carrier of a branch, None for multi-carrier or carrier-free branches.
    pub fn branch_carrier(&self, branch: &Branch) -> Option<Carrier> {
        branch
            .grid
            .and_then(|g| self.grids.get(g.index()))
            .map(Grid::carrier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PowerGridParams;
    use crate::model_common;
    use mf_core::impl_var_set;

    #[derive(Clone, Debug)]
    struct TestNode {
        x: Attr,
    }
    impl_var_set!(TestNode { x });
    model_common!(TestNode);
    impl NodeModel for TestNode {
        fn clone_node(&self) -> Box<dyn NodeModel> {
            Box::new(self.clone())
        }
    }

    #[derive(Clone, Debug)]
    struct TestBranch {
        on_off: Attr,
    }
    impl_var_set!(TestBranch { on_off });
    model_common!(TestBranch);
    impl BranchModel for TestBranch {
        fn clone_branch(&self) -> Box<dyn BranchModel> {
            Box::new(self.clone())
        }
    }

    fn test_net() -> (Network, NodeId, NodeId) {
        let mut net = Network::new();
        let grid = net.add_grid(Grid::power("el", PowerGridParams::default()));
        let a = net.add_node(Box::new(TestNode { x: Attr::var(0.0) }), Some(grid));
        let b = net.add_node(Box::new(TestNode { x: Attr::var(0.0) }), Some(grid));
        (net, a, b)
    }

    #[test]
    fn ids_are_dense_and_monotonic() {
        let (net, a, b) = test_net();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(net.nodes().len(), 2);
    }

    #[test]
    fn branch_endpoints_are_validated() {
        let (mut net, a, _) = test_net();
        let err = net
            .add_branch(
                Box::new(TestBranch { on_off: Attr::con(1.0) }),
                a,
                NodeId::from_index(99),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownNode(_)));
    }

    #[test]
    fn branch_adjacency_is_maintained() {
        let (mut net, a, b) = test_net();
        let br = net
            .add_branch(Box::new(TestBranch { on_off: Attr::con(1.0) }), a, b, None)
            .unwrap();
        assert_eq!(net.node(a).unwrap().from_branch_ids, vec![br]);
        assert_eq!(net.node(b).unwrap().to_branch_ids, vec![br]);
    }

    #[test]
    fn enabled_respects_on_off() {
        let (mut net, a, b) = test_net();
        let br = net
            .add_branch(Box::new(TestBranch { on_off: Attr::con(0.0) }), a, b, None)
            .unwrap();
        assert!(!net.branch(br).unwrap().enabled());

        let br2 = net
            .add_branch(
                Box::new(TestBranch { on_off: Attr::var(0.0) }),
                a,
                b,
                None,
            )
            .unwrap();
        assert!(net.branch(br2).unwrap().enabled());
    }

    #[test]
    fn deep_copy_preserves_ids_and_is_independent() {
        let (mut net, a, _) = test_net();
        let copy = net.clone();

        net.node_mut(a).unwrap().model.set_attr("x", 42.0);
        let original = copy.node(a).unwrap().model.attr("x").unwrap().value();
        assert_eq!(original, 0.0);
        assert_eq!(copy.node(a).unwrap().id, a);
    }

    #[test]
    fn name_lookup() {
        let (mut net, a, _) = test_net();
        net.node_mut(a).unwrap().name = Some("slack".to_string());
        assert_eq!(net.node_by_name("slack").map(|n| n.id), Some(a));
        assert!(net.node_by_name("nope").is_none());
    }
}
