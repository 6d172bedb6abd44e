//! Model traits: the behavior seams of the component graph.
//!
//! Models are data structs implementing `VarSet`; the traits here add what
//! the rest of the stack dispatches on: type identity for the formulation
//! registry (`as_any` + `type_name`), the grid-forming capability flag on
//! childs, the multi-carrier contract on branches, compound expansion, and
//! the inter-step hooks of the timeseries engine.

use crate::error::NetworkResult;
use crate::grid::Carrier;
use crate::network::Network;
use mf_core::{Eid, EquationSystem, NodeId, StepState, SystemResult, VarSet};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Role name → node id wiring of a compound.
pub type ConnectionMap = BTreeMap<&'static str, NodeId>;

/// Shared behavior of all model kinds.
pub trait ModelCommon: VarSet + Any + Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;

    /// Concrete type name, used for result tables and diagnostics.
    fn type_name(&self) -> &'static str;

    /// Attributes whose solved values feed the inter-step state in addition
    /// to tracked variables.
    fn inter_step_vars(&self) -> &'static [&'static str] {
        &[]
    }

    /// Couplings against the previous step's extracted state. Absent state
    /// entries mean "no previous value" and must not produce constraints.
    fn inter_step_equations(
        &self,
        _sys: &mut EquationSystem,
        _prev: &StepState,
        _eid: Eid,
    ) -> SystemResult<()> {
        Ok(())
    }
}

pub trait NodeModel: ModelCommon {
    fn clone_node(&self) -> Box<dyn NodeModel>;
}

pub trait BranchModel: ModelCommon {
    fn clone_branch(&self) -> Box<dyn BranchModel>;

    /// Multi-carrier branches connect nodes of different grids and are
    /// excluded from per-carrier connectivity analysis.
    fn multi_carrier(&self) -> bool {
        false
    }
}

pub trait ChildModel: ModelCommon {
    fn clone_child(&self) -> Box<dyn ChildModel>;

    /// Pins reference quantities on the attached node's model before
    /// declaration (external grids pin voltage or pressure/temperature).
    fn overwrite(&self, _node: &mut dyn NodeModel) {}

    /// Grid-forming childs can energize the component they are attached to.
    fn grid_forming(&self) -> bool {
        false
    }
}

pub trait CompoundModel: ModelCommon {
    fn clone_compound(&self) -> Box<dyn CompoundModel>;

    /// Connection roles and the carrier each referenced node must belong to.
    fn connection_roles(&self) -> &'static [(&'static str, Carrier)];

    /// Expands into owned sub-components, returning their ids. Runs once at
    /// registration; created components are marked as owned by the compound.
    fn expand(&mut self, net: &mut Network, connections: &ConnectionMap)
    -> NetworkResult<Vec<Eid>>;
}

impl Clone for Box<dyn NodeModel> {
    fn clone(&self) -> Self {
        self.clone_node()
    }
}

impl Clone for Box<dyn BranchModel> {
    fn clone(&self) -> Self {
        self.clone_branch()
    }
}

impl Clone for Box<dyn ChildModel> {
    fn clone(&self) -> Self {
        self.clone_child()
    }
}

impl Clone for Box<dyn CompoundModel> {
    fn clone(&self) -> Self {
        self.clone_compound()
    }
}

/// Implements [`ModelCommon`] with defaults for a model struct.
#[macro_export]
macro_rules! model_common {
    ($ty:ident) => {
        impl $crate::model::ModelCommon for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}
