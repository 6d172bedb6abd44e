//! End-to-end electrical steady states through the full pipeline.

use mf_core::Eid;
use mf_models::express;
use mf_graph::{Carrier, Network};
use mf_islanding::IslandingExtension;
use mf_solver::{NewtonBackend, SolverError, solve};
use std::sync::Arc;

fn two_bus() -> (Network, mf_core::NodeId, mf_core::NodeId, mf_core::ChildId) {
    let mut net = Network::new();
    let grid = express::power_grid(&mut net);
    let slack = express::bus(&mut net, grid, 1.0);
    let load_bus = express::bus(&mut net, grid, 1.0);
    express::line(&mut net, grid, slack, load_bus, 100.0).unwrap();
    let ext = express::ext_power_grid(&mut net, slack).unwrap();
    express::power_load(&mut net, load_bus, 0.1, 0.0).unwrap();
    (net, slack, load_bus, ext)
}

#[test]
fn two_bus_power_flow() {
    let (net, slack, load_bus, ext) = two_bus();
    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    // The slack supplies the load plus line losses.
    let supplied = report.value(Eid::Child(ext), "p_mw").unwrap();
    assert!(supplied < 0.0, "slack must generate, got {supplied}");
    assert!((supplied + 0.1).abs() < 2e-3, "supply off: {supplied}");

    // Pinned slack voltage, slightly depressed load voltage.
    assert_eq!(report.value(Eid::Node(slack), "vm_pu"), Some(1.0));
    let vm = report.value(Eid::Node(load_bus), "vm_pu").unwrap();
    assert!(vm < 1.0 && vm > 0.95, "load voltage {vm}");

    // The original network is untouched; the report's copy is solved.
    let original_vm = net
        .node(load_bus)
        .unwrap()
        .model
        .attr("vm_pu")
        .unwrap()
        .value();
    assert_eq!(original_vm, 1.0);
}

#[test]
fn line_flow_matches_load() {
    let (net, _, load_bus, _) = two_bus();
    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    // Receiving-end flow covers the load exactly, by the node balance.
    let branch = net.node(load_bus).unwrap().to_branch_ids[0];
    let p_to = report.value(Eid::Branch(branch), "p_to_mw").unwrap();
    assert!((p_to + 0.1).abs() < 1e-4, "p_to {p_to}");
}

#[test]
fn disconnected_component_is_masked_not_solved() {
    let (mut net, _, _, _) = two_bus();
    // A third bus with no branch and no slack of its own.
    let orphan = express::bus(&mut net, mf_core::GridId::from_index(0), 1.0);
    express::power_load(&mut net, orphan, 0.2, 0.0).unwrap();

    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();
    assert!(report.ignored.contains(&orphan));

    let table = &report.tables["Bus"];
    assert_eq!(table.rows.len(), 3);
    assert!(table.rows[2].values["vm_pu"].is_nan());
    assert!(!table.rows[0].values["vm_pu"].is_nan());

    // Column extraction preserves the NaN mask.
    let vm = table.column("vm_pu");
    assert_eq!(vm.len(), 3);
    assert!(vm[2].is_nan());
}

#[test]
fn repeated_solves_are_identical() {
    let (net, _, load_bus, ext) = two_bus();
    let first = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();
    let second = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    for (eid, attr) in [
        (Eid::Node(load_bus), "vm_pu"),
        (Eid::Node(load_bus), "va_rad"),
        (Eid::Child(ext), "p_mw"),
    ] {
        assert_eq!(first.value(eid, attr), second.value(eid, attr), "{eid} {attr}");
    }
}

#[test]
fn newton_rejects_islanding_systems() {
    let (mut net, _, _, _) = two_bus();
    net.add_extension(Arc::new(IslandingExtension::electricity_only()));
    assert!(net.islanding_active(Carrier::Electricity));

    let err = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap_err();
    assert!(matches!(err, SolverError::Unsupported { .. }));
}

#[test]
fn report_serializes_tables() {
    let (net, _, _, _) = two_bus();
    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();
    let json = report.to_json();
    assert!(json["tables"]["Bus"]["rows"].as_array().unwrap().len() == 2);
}
