//! mf-graph: the multi-carrier network container.
//!
//! A [`Network`] owns grids (carrier parameter sets), nodes, branches,
//! childs (node-attached components) and compounds (cross-carrier coupling
//! units), each carrying a boxed model. Models are plain structs exposing
//! their numeric attributes through `VarSet`; the traits here add the
//! behavior seams the formulation and simulation layers dispatch on.

pub mod error;
pub mod extension;
pub mod grid;
pub mod model;
pub mod network;
pub mod topology;

pub use error::{NetworkError, NetworkResult};
pub use extension::NetworkExtension;
pub use grid::{Carrier, GasGridParams, Grid, GridKind, PowerGridParams, WaterGridParams};
pub use model::{BranchModel, ChildModel, CompoundModel, ConnectionMap, ModelCommon, NodeModel};
pub use network::{Branch, Child, Compound, Network, Node};
pub use topology::{TopologyMode, carrier_components};
