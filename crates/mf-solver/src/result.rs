//! Solve reports and per-type result tables.

use mf_core::{Eid, NodeId, VarSet};
use mf_formulation::{branch_ignored, child_ignored, compound_ignored, node_ignored};
use mf_graph::Network;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One component's solved attribute values. Ignored components keep their
/// row with every value NaN, so table shapes are stable across switching
/// states.
#[derive(Clone, Debug, Serialize)]
pub struct ResultRow {
    pub id: String,
    pub name: Option<String>,
    pub values: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// One column across all rows; missing cells are NaN.
    pub fn column(&self, name: &str) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.values.get(name).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

/// The outcome of a successful solve: the solved working copy of the
/// network, tables grouped by model type name, and auxiliary values for
/// system keys with no model attribute behind them (extension variables).
#[derive(Debug)]
pub struct SolveReport {
    pub network: Network,
    pub tables: BTreeMap<String, ResultTable>,
    pub aux: HashMap<(Eid, &'static str), f64>,
    pub objective: f64,
    pub ignored: HashSet<NodeId>,
}

impl SolveReport {
    /// Solved value of a component attribute: written-back model state
    /// first, then the auxiliary map.
    pub fn value(&self, eid: Eid, name: &str) -> Option<f64> {
        let from_model = match eid {
            Eid::Node(id) => self
                .network
                .node(id)
                .ok()
                .and_then(|n| n.model.attr(name)),
            Eid::Branch(id) => self
                .network
                .branch(id)
                .ok()
                .and_then(|b| b.model.attr(name)),
            Eid::Child(id) => self
                .network
                .child(id)
                .ok()
                .and_then(|c| c.model.attr(name)),
            Eid::Compound(id) => self
                .network
                .compound(id)
                .ok()
                .and_then(|c| c.model.attr(name)),
        };
        from_model
            .map(|a| a.value())
            .or_else(|| self.aux.get(&(eid, name)).copied())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "objective": self.objective,
            "tables": self.tables,
        })
    }
}

fn row(eid: Eid, name: Option<&String>, model: &dyn VarSet, masked: bool) -> ResultRow {
    let mut values = BTreeMap::new();
    model.visit_attrs(&mut |attr_name, attr| {
        let value = if masked { f64::NAN } else { attr.value() };
        values.insert(attr_name.to_string(), value);
    });
    ResultRow {
        id: eid.to_string(),
        name: name.cloned(),
        values,
    }
}

/// Groups every component into a per-model-type table.
pub(crate) fn build_tables(
    net: &Network,
    ignored: &HashSet<NodeId>,
) -> BTreeMap<String, ResultTable> {
    let mut tables: BTreeMap<String, ResultTable> = BTreeMap::new();
    let mut push = |type_name: &'static str, row: ResultRow| {
        tables.entry(type_name.to_string()).or_default().rows.push(row);
    };

    for node in net.nodes() {
        let masked = node_ignored(net, node, ignored);
        push(
            node.model.type_name(),
            row(node.eid(), node.name.as_ref(), node.model.as_ref(), masked),
        );
    }
    for branch in net.branches() {
        let masked = branch_ignored(net, branch, ignored);
        push(
            branch.model.type_name(),
            row(
                branch.eid(),
                branch.name.as_ref(),
                branch.model.as_ref(),
                masked,
            ),
        );
    }
    for child in net.childs() {
        let masked = child_ignored(net, child, ignored);
        push(
            child.model.type_name(),
            row(
                child.eid(),
                child.name.as_ref(),
                child.model.as_ref(),
                masked,
            ),
        );
    }
    for compound in net.compounds() {
        let masked = compound_ignored(net, compound, ignored);
        push(
            compound.model.type_name(),
            row(
                compound.eid(),
                compound.name.as_ref(),
                compound.model.as_ref(),
                masked,
            ),
        );
    }
    tables
}
