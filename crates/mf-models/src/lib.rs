//! mf-models: the concrete model library.
//!
//! Node, branch, child and compound models for the three carriers, plus
//! express-style one-call builders. Models are data only; their equations
//! live in the formulation layer, keyed by model type and carrier.

pub mod branch;
pub mod child;
pub mod compound;
pub mod express;
pub mod node;

pub use branch::{GasPipe, HeatExchanger, PowerLine, TransferBranch, WaterPipe};
pub use child::{
    CouplingFlow, CouplingPower, ExtHydrGrid, ExtPowerGrid, GridFormingGenerator,
    GridFormingSource, PowerGenerator, PowerLoad, RampGenerator, Sink, Source,
};
pub use compound::{Chp, PowerToHeat};
pub use node::{Bus, GasJunction, WaterJunction};

/// Specific heat capacity of water, J/(kg K). Shared by the heat transport
/// templates and the junction heat balances.
pub const WATER_HEAT_CAPACITY: f64 = 4184.0;
