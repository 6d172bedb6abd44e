//! mf-formulation: from a network to an equation system.
//!
//! A [`NetworkFormulation`] maps `(model type, carrier)` pairs to equation
//! templates. [`assemble`] runs the solve-time pipeline: child overwrite,
//! ignored-node analysis, variable declaration, equation dispatch,
//! extension constraints and inter-step couplings.

pub mod assembly;
pub mod error;
pub mod formulation;
pub mod ignored;
pub mod phys;
pub mod standard;

pub use assembly::{Assembled, assemble};
pub use error::{FormResult, FormulationError};
pub use formulation::{
    BranchCtx, BranchFormulation, ChildCtx, ChildFormulation, CompoundCtx, CompoundFormulation,
    NetworkFormulation, NodeCtx, NodeFormulation,
};
pub use ignored::{branch_ignored, child_ignored, compound_ignored, find_ignored_nodes, node_ignored};
pub use standard::standard;
