//! Formulation traits and the dispatch registry.

use crate::error::{FormResult, FormulationError};
use mf_core::EquationSystem;
use mf_graph::{
    Branch, BranchModel, Carrier, Child, ChildModel, Compound, CompoundModel, Grid, Network, Node,
    NodeModel,
};
use std::any::TypeId;
use std::collections::HashMap;

/// Context handed to node formulations: the node plus its non-ignored
/// incident branches and attached childs.
pub struct NodeCtx<'a> {
    pub net: &'a Network,
    pub node: &'a Node,
    pub grid: Option<&'a Grid>,
    pub from_branches: Vec<&'a Branch>,
    pub to_branches: Vec<&'a Branch>,
    pub childs: Vec<&'a Child>,
}

pub struct BranchCtx<'a> {
    pub net: &'a Network,
    pub branch: &'a Branch,
    pub grid: Option<&'a Grid>,
    pub from: &'a Node,
    pub to: &'a Node,
}

pub struct ChildCtx<'a> {
    pub net: &'a Network,
    pub child: &'a Child,
    pub node: &'a Node,
}

pub struct CompoundCtx<'a> {
    pub net: &'a Network,
    pub compound: &'a Compound,
}

/// Equation template for a node model type within one carrier.
///
/// `declare` defaults to registering every model attribute; override it only
/// when a formulation needs auxiliary variables of its own.
pub trait NodeFormulation: Send + Sync {
    fn declare(&self, sys: &mut EquationSystem, node: &Node) -> FormResult<()> {
        sys.declare_model(node.eid(), node.model.as_ref())?;
        Ok(())
    }

    fn equations(&self, sys: &mut EquationSystem, ctx: &NodeCtx<'_>) -> FormResult<()>;
}

pub trait BranchFormulation: Send + Sync {
    fn declare(&self, sys: &mut EquationSystem, branch: &Branch) -> FormResult<()> {
        sys.declare_model(branch.eid(), branch.model.as_ref())?;
        Ok(())
    }

    fn equations(&self, sys: &mut EquationSystem, ctx: &BranchCtx<'_>) -> FormResult<()>;
}

pub trait ChildFormulation: Send + Sync {
    fn declare(&self, sys: &mut EquationSystem, child: &Child) -> FormResult<()> {
        sys.declare_model(child.eid(), child.model.as_ref())?;
        Ok(())
    }

    /// Most childs only contribute terms to their node's balance and need no
    /// equations of their own.
    fn equations(&self, _sys: &mut EquationSystem, _ctx: &ChildCtx<'_>) -> FormResult<()> {
        Ok(())
    }
}

pub trait CompoundFormulation: Send + Sync {
    fn declare(&self, sys: &mut EquationSystem, compound: &Compound) -> FormResult<()> {
        sys.declare_model(compound.eid(), compound.model.as_ref())?;
        Ok(())
    }

    fn equations(&self, _sys: &mut EquationSystem, _ctx: &CompoundCtx<'_>) -> FormResult<()> {
        Ok(())
    }
}

type Key = (TypeId, Option<Carrier>);

/// The dispatch registry: `(concrete model type, carrier)` → formulation.
///
/// Lookup first tries the exact carrier, then the carrier-neutral entry
/// (`None`), so carrier-independent templates need one registration.
#[derive(Default)]
pub struct NetworkFormulation {
    nodes: HashMap<Key, Box<dyn NodeFormulation>>,
    branches: HashMap<Key, Box<dyn BranchFormulation>>,
    childs: HashMap<Key, Box<dyn ChildFormulation>>,
    compounds: HashMap<Key, Box<dyn CompoundFormulation>>,
}

impl NetworkFormulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node<M: NodeModel>(
        &mut self,
        carrier: Option<Carrier>,
        f: impl NodeFormulation + 'static,
    ) -> &mut Self {
        self.nodes.insert((TypeId::of::<M>(), carrier), Box::new(f));
        self
    }

    pub fn register_branch<M: BranchModel>(
        &mut self,
        carrier: Option<Carrier>,
        f: impl BranchFormulation + 'static,
    ) -> &mut Self {
        self.branches
            .insert((TypeId::of::<M>(), carrier), Box::new(f));
        self
    }

    pub fn register_child<M: ChildModel>(
        &mut self,
        carrier: Option<Carrier>,
        f: impl ChildFormulation + 'static,
    ) -> &mut Self {
        self.childs.insert((TypeId::of::<M>(), carrier), Box::new(f));
        self
    }

    pub fn register_compound<M: CompoundModel>(
        &mut self,
        carrier: Option<Carrier>,
        f: impl CompoundFormulation + 'static,
    ) -> &mut Self {
        self.compounds
            .insert((TypeId::of::<M>(), carrier), Box::new(f));
        self
    }

    fn lookup<'a, T: ?Sized>(
        map: &'a HashMap<Key, Box<T>>,
        tid: TypeId,
        carrier: Option<Carrier>,
    ) -> Option<&'a T> {
        map.get(&(tid, carrier))
            .or_else(|| map.get(&(tid, None)))
            .map(|b| b.as_ref())
    }

    pub fn node_for(
        &self,
        node: &Node,
        carrier: Option<Carrier>,
    ) -> FormResult<&dyn NodeFormulation> {
        Self::lookup(&self.nodes, node.model.as_any().type_id(), carrier).ok_or(
            FormulationError::MissingFormulation {
                kind: "node",
                model: node.model.type_name(),
                eid: node.eid(),
                carrier,
            },
        )
    }

    pub fn branch_for(
        &self,
        branch: &Branch,
        carrier: Option<Carrier>,
    ) -> FormResult<&dyn BranchFormulation> {
        Self::lookup(&self.branches, branch.model.as_any().type_id(), carrier).ok_or(
            FormulationError::MissingFormulation {
                kind: "branch",
                model: branch.model.type_name(),
                eid: branch.eid(),
                carrier,
            },
        )
    }

    pub fn child_for(
        &self,
        child: &Child,
        carrier: Option<Carrier>,
    ) -> FormResult<&dyn ChildFormulation> {
        Self::lookup(&self.childs, child.model.as_any().type_id(), carrier).ok_or(
            FormulationError::MissingFormulation {
                kind: "child",
                model: child.model.type_name(),
                eid: child.eid(),
                carrier,
            },
        )
    }

    pub fn compound_for(&self, compound: &Compound) -> FormResult<&dyn CompoundFormulation> {
        Self::lookup(&self.compounds, compound.model.as_any().type_id(), None).ok_or(
            FormulationError::MissingFormulation {
                kind: "compound",
                model: compound.model.type_name(),
                eid: compound.eid(),
                carrier: None,
            },
        )
    }
}
