//! One-call network construction helpers.
//!
//! These keep scenario setup terse; tests and downstream code build whole
//! networks from a handful of calls.

use crate::branch::{GasPipe, HeatExchanger, PowerLine, WaterPipe};
use crate::child::{ExtHydrGrid, ExtPowerGrid, PowerGenerator, PowerLoad, Sink, Source};
use crate::compound::{Chp, PowerToHeat};
use crate::node::{Bus, GasJunction, WaterJunction};
use mf_core::{BranchId, ChildId, CompoundId, GridId, NodeId};
use mf_graph::{
    ConnectionMap, GasGridParams, Grid, Network, NetworkResult, PowerGridParams, WaterGridParams,
};

pub fn power_grid(net: &mut Network) -> GridId {
    net.add_grid(Grid::power("power", PowerGridParams::default()))
}

pub fn gas_grid(net: &mut Network) -> GridId {
    net.add_grid(Grid::gas("gas", GasGridParams::default()))
}

pub fn water_grid(net: &mut Network) -> GridId {
    net.add_grid(Grid::water("water", WaterGridParams::default()))
}

pub fn bus(net: &mut Network, grid: GridId, base_kv: f64) -> NodeId {
    net.add_node(Box::new(Bus::new(base_kv)), Some(grid))
}

pub fn gas_junction(net: &mut Network, grid: GridId) -> NodeId {
    net.add_node(Box::new(GasJunction::new()), Some(grid))
}

pub fn water_junction(net: &mut Network, grid: GridId) -> NodeId {
    net.add_node(Box::new(WaterJunction::new()), Some(grid))
}

pub fn line(
    net: &mut Network,
    grid: GridId,
    from: NodeId,
    to: NodeId,
    length_m: f64,
) -> NetworkResult<BranchId> {
    net.add_branch(
        Box::new(PowerLine::new(length_m, 7.0e-5, 7.0e-5, 1.0)),
        from,
        to,
        Some(grid),
    )
}

pub fn gas_pipe(
    net: &mut Network,
    grid: GridId,
    from: NodeId,
    to: NodeId,
    diameter_m: f64,
    length_m: f64,
) -> NetworkResult<BranchId> {
    net.add_branch(
        Box::new(GasPipe::new(diameter_m, length_m)),
        from,
        to,
        Some(grid),
    )
}

pub fn water_pipe(
    net: &mut Network,
    grid: GridId,
    from: NodeId,
    to: NodeId,
    diameter_m: f64,
    length_m: f64,
) -> NetworkResult<BranchId> {
    net.add_branch(
        Box::new(WaterPipe::new(diameter_m, length_m)),
        from,
        to,
        Some(grid),
    )
}

pub fn heat_exchanger_load(
    net: &mut Network,
    grid: GridId,
    from: NodeId,
    to: NodeId,
    q_w: f64,
) -> NetworkResult<BranchId> {
    net.add_branch(Box::new(HeatExchanger::load(q_w)), from, to, Some(grid))
}

pub fn power_load(net: &mut Network, node: NodeId, p_mw: f64, q_mvar: f64) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(PowerLoad::new(p_mw, q_mvar)))
}

pub fn power_generator(
    net: &mut Network,
    node: NodeId,
    p_mw: f64,
    q_mvar: f64,
) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(PowerGenerator::new(p_mw, q_mvar)))
}

/// Slack child with flat-start defaults (vm = 1 pu, va = 0).
pub fn ext_power_grid(net: &mut Network, node: NodeId) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(ExtPowerGrid::new(0.0, 0.0, 1.0, 0.0)))
}

pub fn sink(net: &mut Network, node: NodeId, mass_flow: f64) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(Sink::new(mass_flow)))
}

pub fn source(net: &mut Network, node: NodeId, mass_flow: f64) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(Source::new(mass_flow)))
}

pub fn ext_hydr_grid(net: &mut Network, node: NodeId) -> NetworkResult<ChildId> {
    net.add_child(node, Box::new(ExtHydrGrid::new()))
}

#[allow(clippy::too_many_arguments)]
pub fn chp(
    net: &mut Network,
    gas_node: NodeId,
    power_node: NodeId,
    heat_node: NodeId,
    heat_return_node: NodeId,
    mass_flow: f64,
    efficiency_power: f64,
    efficiency_heat: f64,
) -> NetworkResult<CompoundId> {
    let mut connections = ConnectionMap::new();
    connections.insert("gas", gas_node);
    connections.insert("power", power_node);
    connections.insert("heat", heat_node);
    connections.insert("heat_return", heat_return_node);
    net.add_compound(
        Box::new(Chp::new(mass_flow, efficiency_power, efficiency_heat)),
        connections,
    )
}

pub fn power_to_heat(
    net: &mut Network,
    power_node: NodeId,
    heat_node: NodeId,
    heat_return_node: NodeId,
    p_mw: f64,
    efficiency: f64,
) -> NetworkResult<CompoundId> {
    let mut connections = ConnectionMap::new();
    connections.insert("power", power_node);
    connections.insert("heat", heat_node);
    connections.insert("heat_return", heat_return_node);
    net.add_compound(Box::new(PowerToHeat::new(p_mw, efficiency)), connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_bus_scenario() {
        let mut net = Network::new();
        let grid = power_grid(&mut net);
        let slack = bus(&mut net, grid, 1.0);
        let load_bus = bus(&mut net, grid, 1.0);
        line(&mut net, grid, slack, load_bus, 100.0).unwrap();
        ext_power_grid(&mut net, slack).unwrap();
        power_load(&mut net, load_bus, 0.1, 0.0).unwrap();

        assert_eq!(net.nodes().len(), 2);
        assert_eq!(net.branches().len(), 1);
        assert_eq!(net.childs().len(), 2);
    }
}
