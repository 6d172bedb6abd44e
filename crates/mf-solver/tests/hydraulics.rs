//! Gas and heating-water steady states.

use mf_core::Eid;
use mf_graph::Network;
use mf_models::express;
use mf_solver::{NewtonBackend, solve};

#[test]
fn gas_two_junction_pressure_drop() {
    let mut net = Network::new();
    let grid = express::gas_grid(&mut net);
    let feed = express::gas_junction(&mut net, grid);
    let demand = express::gas_junction(&mut net, grid);
    let pipe = express::gas_pipe(&mut net, grid, feed, demand, 0.5, 100.0).unwrap();
    let ext = express::ext_hydr_grid(&mut net, feed).unwrap();
    express::sink(&mut net, demand, 0.1).unwrap();

    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    // The external grid covers the sink exactly.
    let supplied = report.value(Eid::Child(ext), "mass_flow").unwrap();
    assert!((supplied - 0.1).abs() < 1e-5, "supplied {supplied}");
    let flow = report.value(Eid::Branch(pipe), "mass_flow").unwrap();
    assert!((flow - 0.1).abs() < 1e-5, "pipe flow {flow}");

    // Pressure drops along the flow, pinned to 1 pu at the feed.
    assert_eq!(report.value(Eid::Node(feed), "pressure_pu"), Some(1.0));
    let p = report.value(Eid::Node(demand), "pressure_pu").unwrap();
    assert!(p < 1.0 && p > 0.5, "demand pressure {p}");
}

#[test]
fn water_pipe_cools_toward_ambient() {
    let mut net = Network::new();
    let grid = express::water_grid(&mut net);
    let feed = express::water_junction(&mut net, grid);
    let demand = express::water_junction(&mut net, grid);
    let pipe = express::water_pipe(&mut net, grid, feed, demand, 0.1, 100.0).unwrap();
    express::ext_hydr_grid(&mut net, feed).unwrap();
    express::sink(&mut net, demand, 0.1).unwrap();

    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    // Feed temperature is pinned by the external grid; transport loses heat
    // to the 293 K environment on the way.
    assert_eq!(report.value(Eid::Node(feed), "t_k"), Some(359.0));
    let t = report.value(Eid::Node(demand), "t_k").unwrap();
    assert!(t < 359.0 && t > 340.0, "arrival temperature {t}");

    let q_w = report.value(Eid::Branch(pipe), "q_w").unwrap();
    assert!(q_w > 0.0, "heat loss {q_w}");

    // Mild hydraulic gradient at 0.1 kg/s through a 10 cm pipe.
    let p = report.value(Eid::Node(demand), "pressure_pu").unwrap();
    assert!(p < 1.0 && p > 0.99, "demand pressure {p}");
}

#[test]
fn heat_exchanger_load_extracts_heat() {
    let mut net = Network::new();
    let grid = express::water_grid(&mut net);
    let feed = express::water_junction(&mut net, grid);
    let ret = express::water_junction(&mut net, grid);
    // A 20 kW consumer between feed and return; the sink draws the
    // circulation through it.
    let exchanger = express::heat_exchanger_load(&mut net, grid, feed, ret, 2.0e4).unwrap();
    express::ext_hydr_grid(&mut net, feed).unwrap();
    express::sink(&mut net, ret, 0.1).unwrap();

    let report = solve(&net, &mf_formulation::standard(), &NewtonBackend::default()).unwrap();

    // 20 kW over c * dT: the return side comes back colder.
    let t_from = report.value(Eid::Branch(exchanger), "t_from_k").unwrap();
    let t_to = report.value(Eid::Branch(exchanger), "t_to_k").unwrap();
    assert!((t_from - 359.0).abs() < 1e-3, "feed side {t_from}");
    assert!(t_to < t_from, "exchanger must cool: {t_from} -> {t_to}");

    // No pressure drop across the exchanger.
    let p = report.value(Eid::Node(ret), "pressure_pu").unwrap();
    assert!((p - 1.0).abs() < 1e-6, "return pressure {p}");

    let flow = report.value(Eid::Branch(exchanger), "mass_flow").unwrap();
    assert!((flow - 0.1).abs() < 1e-5);
    let dt = t_from - t_to;
    assert!((flow * 4184.0 * dt - 2.0e4).abs() < 10.0, "q balance");
}
