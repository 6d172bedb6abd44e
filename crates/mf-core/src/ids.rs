//! Compact, copyable ids for network components.
//!
//! Each component kind has its own id newtype so a `BranchId` can never be
//! confused with a `NodeId`. `Eid` unifies the four component kinds into a
//! single key used by the variable arena and the inter-step state.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_newtype!(
    /// Id of a node within a network.
    NodeId, "n"
);
id_newtype!(
    /// Id of a branch within a network.
    BranchId, "br"
);
id_newtype!(
    /// Id of a child (node-attached component) within a network.
    ChildId, "ch"
);
id_newtype!(
    /// Id of a compound (multi-component coupling unit) within a network.
    CompoundId, "cp"
);
id_newtype!(
    /// Id of a grid (carrier parameter set) within a network.
    GridId, "g"
);

/// Unified component key: node, branch, child or compound.
///
/// Variables in the equation system and entries of the inter-step state are
/// keyed by `(Eid, attribute name)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Eid {
    Node(NodeId),
    Branch(BranchId),
    Child(ChildId),
    Compound(CompoundId),
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eid::Node(id) => write!(f, "{id}"),
            Eid::Branch(id) => write!(f, "{id}"),
            Eid::Child(id) => write!(f, "{id}"),
            Eid::Compound(id) => write!(f, "{id}"),
        }
    }
}

impl From<NodeId> for Eid {
    fn from(id: NodeId) -> Self {
        Eid::Node(id)
    }
}

impl From<BranchId> for Eid {
    fn from(id: BranchId) -> Self {
        Eid::Branch(id)
    }
}

impl From<ChildId> for Eid {
    fn from(id: ChildId) -> Self {
        Eid::Child(id)
    }
}

impl From<CompoundId> for Eid {
    fn from(id: CompoundId) -> Self {
        Eid::Compound(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip() {
        let id = NodeId::from_index(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "n42");
    }

    #[test]
    fn eid_display_is_kind_prefixed() {
        assert_eq!(Eid::from(BranchId::from_index(3)).to_string(), "br3");
        assert_eq!(Eid::from(CompoundId::from_index(0)).to_string(), "cp0");
    }

    #[test]
    fn eid_kinds_do_not_collide() {
        let a = Eid::from(NodeId::from_index(1));
        let b = Eid::from(ChildId::from_index(1));
        assert_ne!(a, b);
    }
}
