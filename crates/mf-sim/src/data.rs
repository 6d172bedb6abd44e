//! Timeseries data: per-attribute value series keyed by component.
//!
//! Components are addressed by id or, for childs, branches and compounds,
//! by name; when both series exist for the same attribute, the named series
//! is injected last and wins. All series share one length, locked by the
//! first registration.

use crate::error::{SimError, SimResult};
use mf_core::{Attr, BranchId, ChildId, CompoundId, NodeId, VarSet};
use mf_graph::Network;
use std::collections::BTreeMap;
use tracing::warn;

type IdSeries<K> = BTreeMap<(K, String), Vec<f64>>;
type NameSeries = BTreeMap<(String, String), Vec<f64>>;

#[derive(Clone, Debug, Default)]
pub struct TimeseriesData {
    len: Option<usize>,
    nodes: IdSeries<NodeId>,
    childs: IdSeries<ChildId>,
    childs_by_name: NameSeries,
    branches: IdSeries<BranchId>,
    branches_by_name: NameSeries,
    compounds: IdSeries<CompoundId>,
    compounds_by_name: NameSeries,
}

impl TimeseriesData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps all series carry, None while empty.
    pub fn len(&self) -> Option<usize> {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len.is_none()
    }

    fn check_len(&mut self, values: &[f64]) -> SimResult<()> {
        match self.len {
            None => {
                self.len = Some(values.len());
                Ok(())
            }
            Some(expected) if expected == values.len() => Ok(()),
            Some(expected) => Err(SimError::SeriesLengthMismatch {
                expected,
                got: values.len(),
            }),
        }
    }

    pub fn add_node_series(
        &mut self,
        node: NodeId,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.nodes.insert((node, attr.into()), values);
        Ok(())
    }

    pub fn add_child_series(
        &mut self,
        child: ChildId,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.childs.insert((child, attr.into()), values);
        Ok(())
    }

    pub fn add_child_series_by_name(
        &mut self,
        name: impl Into<String>,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.childs_by_name.insert((name.into(), attr.into()), values);
        Ok(())
    }

    pub fn add_branch_series(
        &mut self,
        branch: BranchId,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.branches.insert((branch, attr.into()), values);
        Ok(())
    }

    pub fn add_branch_series_by_name(
        &mut self,
        name: impl Into<String>,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.branches_by_name
            .insert((name.into(), attr.into()), values);
        Ok(())
    }

    pub fn add_compound_series(
        &mut self,
        compound: CompoundId,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.compounds.insert((compound, attr.into()), values);
        Ok(())
    }

    pub fn add_compound_series_by_name(
        &mut self,
        name: impl Into<String>,
        attr: impl Into<String>,
        values: Vec<f64>,
    ) -> SimResult<()> {
        self.check_len(&values)?;
        self.compounds_by_name
            .insert((name.into(), attr.into()), values);
        Ok(())
    }

    /// Merges another data set into this one; on key conflicts this set's
    /// series win. Lengths must agree when both sides carry series.
    pub fn extend(&mut self, other: &TimeseriesData) -> SimResult<()> {
        if let (Some(expected), Some(got)) = (self.len, other.len) {
            if expected != got {
                return Err(SimError::SeriesLengthMismatch { expected, got });
            }
        }
        if self.len.is_none() {
            self.len = other.len;
        }

        fn merge<K: Ord + Clone>(
            mine: &mut BTreeMap<K, Vec<f64>>,
            theirs: &BTreeMap<K, Vec<f64>>,
        ) {
            for (key, values) in theirs {
                mine.entry(key.clone()).or_insert_with(|| values.clone());
            }
        }
        merge(&mut self.nodes, &other.nodes);
        merge(&mut self.childs, &other.childs);
        merge(&mut self.childs_by_name, &other.childs_by_name);
        merge(&mut self.branches, &other.branches);
        merge(&mut self.branches_by_name, &other.branches_by_name);
        merge(&mut self.compounds, &other.compounds);
        merge(&mut self.compounds_by_name, &other.compounds_by_name);
        Ok(())
    }

    /// Injects one step into the network: nodes, then childs, branches and
    /// compounds, id-keyed series before named ones so names win. Tracked
    /// variables are pinned to the injected value through degenerate
    /// bounds; everything else is a plain value update.
    pub fn apply(&self, net: &mut Network, step: usize) -> SimResult<()> {
        for ((id, attr), values) in &self.nodes {
            let node = net.node_mut(*id)?;
            inject(node.model.as_mut(), attr, values[step]);
        }

        for ((id, attr), values) in &self.childs {
            let child = net.child_mut(*id)?;
            inject(child.model.as_mut(), attr, values[step]);
        }
        for ((name, attr), values) in &self.childs_by_name {
            let Some(id) = net.child_by_name(name).map(|c| c.id) else {
                warn!(name = %name, "no child with this name; series skipped");
                continue;
            };
            inject(net.child_mut(id)?.model.as_mut(), attr, values[step]);
        }

        for ((id, attr), values) in &self.branches {
            let branch = net.branch_mut(*id)?;
            inject(branch.model.as_mut(), attr, values[step]);
        }
        for ((name, attr), values) in &self.branches_by_name {
            let Some(id) = net.branch_by_name(name).map(|b| b.id) else {
                warn!(name = %name, "no branch with this name; series skipped");
                continue;
            };
            inject(net.branch_mut(id)?.model.as_mut(), attr, values[step]);
        }

        for ((id, attr), values) in &self.compounds {
            let compound = net.compound_mut(*id)?;
            inject(compound.model.as_mut(), attr, values[step]);
        }
        for ((name, attr), values) in &self.compounds_by_name {
            let Some(id) = net.compound_by_name(name).map(|c| c.id) else {
                warn!(name = %name, "no compound with this name; series skipped");
                continue;
            };
            inject(net.compound_mut(id)?.model.as_mut(), attr, values[step]);
        }
        Ok(())
    }
}

fn inject(model: &mut dyn VarSet, attr: &str, value: f64) {
    let mut found = false;
    model.visit_attrs_mut(&mut |name, a| {
        if name != attr {
            return;
        }
        found = true;
        match a {
            Attr::Var(spec) if spec.tracked => {
                spec.value = value;
                spec.min = Some(value);
                spec.max = Some(value);
            }
            _ => a.set_value(value),
        }
    });
    if !found {
        warn!(attr, "component has no such attribute; series value dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_models::{ExtPowerGrid, PowerLoad, express};

    #[test]
    fn first_registration_locks_the_length() {
        let mut data = TimeseriesData::new();
        data.add_child_series(ChildId::from_index(0), "p_mw", vec![1.0, 2.0])
            .unwrap();
        let err = data
            .add_child_series(ChildId::from_index(1), "p_mw", vec![1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::SeriesLengthMismatch { expected: 2, got: 1 }
        ));
        assert_eq!(data.len(), Some(2));
    }

    #[test]
    fn extend_keeps_own_series_on_conflict() {
        let mut mine = TimeseriesData::new();
        mine.add_child_series(ChildId::from_index(0), "p_mw", vec![1.0])
            .unwrap();
        let mut theirs = TimeseriesData::new();
        theirs
            .add_child_series(ChildId::from_index(0), "p_mw", vec![9.0])
            .unwrap();
        theirs
            .add_child_series(ChildId::from_index(1), "p_mw", vec![5.0])
            .unwrap();

        mine.extend(&theirs).unwrap();
        assert_eq!(mine.childs[&(ChildId::from_index(0), "p_mw".into())], vec![1.0]);
        assert_eq!(mine.childs[&(ChildId::from_index(1), "p_mw".into())], vec![5.0]);
    }

    #[test]
    fn named_series_overrides_id_series() {
        let mut net = mf_graph::Network::new();
        let grid = express::power_grid(&mut net);
        let bus = express::bus(&mut net, grid, 1.0);
        let load = express::power_load(&mut net, bus, 0.1, 0.0).unwrap();
        net.child_mut(load).unwrap().name = Some("city".to_string());

        let mut data = TimeseriesData::new();
        data.add_child_series(load, "p_mw", vec![0.5]).unwrap();
        data.add_child_series_by_name("city", "p_mw", vec![0.7])
            .unwrap();

        data.apply(&mut net, 0).unwrap();
        let model = &net.child(load).unwrap().model;
        assert_eq!(model.attr("p_mw").unwrap().value(), 0.7);
        assert!(model.as_any().downcast_ref::<PowerLoad>().is_some());
    }

    #[test]
    fn tracked_injection_pins_bounds() {
        let mut net = mf_graph::Network::new();
        let grid = express::power_grid(&mut net);
        let bus = express::bus(&mut net, grid, 1.0);
        let slack = express::ext_power_grid(&mut net, bus).unwrap();

        let mut data = TimeseriesData::new();
        data.add_child_series(slack, "p_mw", vec![-0.3]).unwrap();
        data.apply(&mut net, 0).unwrap();

        let model = &net.child(slack).unwrap().model;
        assert!(model.as_any().downcast_ref::<ExtPowerGrid>().is_some());
        let Attr::Var(spec) = model.attr("p_mw").unwrap() else {
            panic!("p_mw must stay a variable");
        };
        assert_eq!(spec.value, -0.3);
        assert_eq!(spec.min, Some(-0.3));
        assert_eq!(spec.max, Some(-0.3));
    }
}
