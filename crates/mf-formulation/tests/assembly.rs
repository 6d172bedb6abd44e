//! Assembly pipeline behavior on small networks.

use mf_core::{Attr, EquationSystem, NodeId, SystemResult};
use mf_formulation::{FormulationError, NetworkFormulation, assemble, standard};
use mf_graph::{Carrier, Network, NetworkExtension};
use mf_models::express;
use std::collections::HashSet;
use std::sync::Arc;

fn two_bus(net: &mut Network) -> (NodeId, NodeId) {
    let grid = express::power_grid(net);
    let feed = express::bus(net, grid, 1.0);
    let city = express::bus(net, grid, 1.0);
    express::line(net, grid, feed, city, 100.0).unwrap();
    express::ext_power_grid(net, feed).unwrap();
    express::power_load(net, city, 0.1, 0.0).unwrap();
    (feed, city)
}

#[test]
fn two_bus_assembles_square() {
    let mut net = Network::new();
    two_bus(&mut net);

    let assembled = assemble(&mut net, &standard(), None).unwrap();
    assert!(assembled.ignored.is_empty());
    // Slack vm/va are pinned to constants by the overwrite pass, leaving
    // p/q there; the other bus carries all four, the line its four flows,
    // the external grid its two setpoints.
    assert_eq!(assembled.system.num_vars(), 12);
    assert_eq!(assembled.system.num_equations(), 12);
}

#[test]
fn overwrite_pins_reference_quantities() {
    let mut net = Network::new();
    let (feed, _) = two_bus(&mut net);

    assemble(&mut net, &standard(), None).unwrap();

    let model = &net.node(feed).unwrap().model;
    assert_eq!(model.attr("vm_pu"), Some(Attr::con(1.0)));
    assert_eq!(model.attr("va_rad"), Some(Attr::con(0.0)));
}

#[test]
fn missing_formulation_names_the_model() {
    let mut net = Network::new();
    two_bus(&mut net);

    let err = assemble(&mut net, &NetworkFormulation::new(), None).unwrap_err();
    match err {
        FormulationError::MissingFormulation { kind, model, .. } => {
            assert_eq!(kind, "node");
            assert_eq!(model, "Bus");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[derive(Debug)]
struct ManagedIslanding;

impl NetworkExtension for ManagedIslanding {
    fn name(&self) -> &'static str {
        "managed-islanding"
    }

    fn manages_islanding(&self, carrier: Carrier) -> bool {
        carrier == Carrier::Electricity
    }

    fn prepare(
        &self,
        _net: &Network,
        _sys: &mut EquationSystem,
        _ignored: &HashSet<NodeId>,
    ) -> SystemResult<()> {
        Ok(())
    }

    fn equations(
        &self,
        _net: &Network,
        _sys: &mut EquationSystem,
        _ignored: &HashSet<NodeId>,
    ) -> SystemResult<()> {
        Ok(())
    }
}

#[test]
fn managed_islanding_switches_to_the_complete_topology() {
    // An open switch cuts the load bus off from the slack. Under plain
    // assembly that component has no reference and is pruned; an extension
    // that manages electrical islanding keeps it in the system.
    let build = |managed: bool| {
        let mut net = Network::new();
        let grid = express::power_grid(&mut net);
        let feed = express::bus(&mut net, grid, 1.0);
        let city = express::bus(&mut net, grid, 1.0);
        let line = express::line(&mut net, grid, feed, city, 100.0).unwrap();
        net.branch_mut(line)
            .unwrap()
            .model
            .set_attr("on_off", 0.0);
        express::ext_power_grid(&mut net, feed).unwrap();
        express::power_load(&mut net, city, 0.1, 0.0).unwrap();
        if managed {
            net.add_extension(Arc::new(ManagedIslanding));
        }
        (net, city)
    };

    let (mut plain, city) = build(false);
    let assembled = assemble(&mut plain, &standard(), None).unwrap();
    assert!(assembled.ignored.contains(&city));

    let (mut managed, city) = build(true);
    let assembled = assemble(&mut managed, &standard(), None).unwrap();
    assert!(assembled.ignored.is_empty(), "complete topology keeps {city:?}");
}
