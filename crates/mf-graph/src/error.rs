use crate::grid::Carrier;
use mf_core::{BranchId, ChildId, CompoundId, GridId, NodeId};
use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown branch {0}")]
    UnknownBranch(BranchId),

    #[error("unknown child {0}")]
    UnknownChild(ChildId),

    #[error("unknown compound {0}")]
    UnknownCompound(CompoundId),

    #[error("unknown grid {0}")]
    UnknownGrid(GridId),

    #[error("compound connection '{role}' is missing")]
    MissingConnection { role: &'static str },

    #[error(
        "compound connection '{role}' expects a {expected} node, but node {node} belongs to {found:?}"
    )]
    ConnectionCarrierMismatch {
        role: &'static str,
        expected: Carrier,
        node: NodeId,
        found: Option<Carrier>,
    },
}
