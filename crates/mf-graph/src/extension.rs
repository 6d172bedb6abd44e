//! Network extensions: ordered constraint providers.
//!
//! Extensions participate in assembly through a two-phase protocol: a
//! `prepare` pass declaring auxiliary variables before equations are
//! emitted, then an `equations` pass. They are shared across network deep
//! copies (the timeseries engine copies the network every step).

use crate::grid::Carrier;
use crate::network::Network;
use mf_core::{EquationSystem, NodeId, SystemResult};
use std::collections::HashSet;
use std::fmt::Debug;

pub trait NetworkExtension: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Whether this extension takes over connectivity handling for a
    /// carrier. When true, the ignored-node analysis for that carrier runs
    /// on the complete topology instead of the enabled-branch topology.
    fn manages_islanding(&self, _carrier: Carrier) -> bool {
        false
    }

    /// Declares auxiliary variables. Runs after model declaration; extension
    /// keys must not collide with model attribute names.
    fn prepare(
        &self,
        net: &Network,
        sys: &mut EquationSystem,
        ignored: &HashSet<NodeId>,
    ) -> SystemResult<()>;

    /// Emits the extension's constraints.
    fn equations(
        &self,
        net: &Network,
        sys: &mut EquationSystem,
        ignored: &HashSet<NodeId>,
    ) -> SystemResult<()>;
}
