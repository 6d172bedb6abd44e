//! The solve pipeline: assemble, run a backend, write results back.

use crate::backend::SolverBackend;
use crate::error::SolverResult;
use crate::result::{SolveReport, build_tables};
use mf_core::{Eid, EquationSystem, StepState};
use mf_formulation::{NetworkFormulation, assemble};
use mf_graph::Network;
use std::collections::HashMap;
use tracing::info;

/// Solves the network's steady state. The caller's network is untouched;
/// the report carries the solved working copy.
pub fn solve(
    net: &Network,
    form: &NetworkFormulation,
    backend: &dyn SolverBackend,
) -> SolverResult<SolveReport> {
    solve_with_state(net, form, backend, None)
}

/// Like [`solve`], with the previous timeseries step's extracted state made
/// available to inter-step constraints.
pub fn solve_with_state(
    net: &Network,
    form: &NetworkFormulation,
    backend: &dyn SolverBackend,
    prev: Option<&StepState>,
) -> SolverResult<SolveReport> {
    let mut work = net.clone();
    let assembled = assemble(&mut work, form, prev)?;
    let solution = backend.solve(&assembled.system)?;
    let aux = write_back(&mut work, &assembled.system, &solution.values)?;
    let tables = build_tables(&work, &assembled.ignored);

    info!(
        backend = backend.name(),
        vars = assembled.system.num_vars(),
        equations = assembled.system.num_equations(),
        ignored = assembled.ignored.len(),
        "network solved"
    );

    Ok(SolveReport {
        network: work,
        tables,
        aux,
        objective: solution.objective,
        ignored: assembled.ignored,
    })
}

/// Writes solved values into the owning models; keys without a backing
/// model attribute (extension variables) go to the auxiliary map.
fn write_back(
    net: &mut Network,
    sys: &EquationSystem,
    values: &[f64],
) -> SolverResult<HashMap<(Eid, &'static str), f64>> {
    let mut aux = HashMap::new();
    for (decl, &value) in sys.decls().iter().zip(values) {
        let written = match decl.eid {
            Eid::Node(id) => net.node_mut(id)?.model.set_attr(decl.name, value),
            Eid::Branch(id) => net.branch_mut(id)?.model.set_attr(decl.name, value),
            Eid::Child(id) => net.child_mut(id)?.model.set_attr(decl.name, value),
            Eid::Compound(id) => net.compound_mut(id)?.model.set_attr(decl.name, value),
        };
        if !written {
            aux.insert((decl.eid, decl.name), value);
        }
    }
    Ok(aux)
}
