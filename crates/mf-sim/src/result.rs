//! Per-step outcomes of a timeseries run.

use mf_core::Eid;
use mf_solver::{SolveReport, SolverError};

/// What a single step produced. Failed steps keep their error so a run
/// under the skip policy stays inspectable afterwards.
#[derive(Debug)]
pub enum StepOutcome {
    Solved(SolveReport),
    Failed(SolverError),
    /// The step was injected but never solved (dry runs).
    Skipped,
}

#[derive(Debug)]
pub struct StepRecord {
    pub step: usize,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn report(&self) -> Option<&SolveReport> {
        match &self.outcome {
            StepOutcome::Solved(report) => Some(report),
            _ => None,
        }
    }
}

/// The ordered records of a run, one per requested step.
#[derive(Debug, Default)]
pub struct TimeseriesResult {
    pub steps: Vec<StepRecord>,
}

impl TimeseriesResult {
    /// Solved steps only, in order.
    pub fn solved(&self) -> impl Iterator<Item = (usize, &SolveReport)> + '_ {
        self.steps
            .iter()
            .filter_map(|r| r.report().map(|rep| (r.step, rep)))
    }

    pub fn num_solved(&self) -> usize {
        self.solved().count()
    }

    pub fn num_failed(&self) -> usize {
        self.steps
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed(_)))
            .count()
    }

    /// One attribute across all solved steps; `None` where the step failed
    /// or the component never carried the attribute.
    pub fn series(&self, eid: Eid, attr: &str) -> Vec<Option<f64>> {
        self.steps
            .iter()
            .map(|r| r.report().and_then(|rep| rep.value(eid, attr)))
            .collect()
    }

    /// Table view over a model type: one row per solved step (carrying its
    /// step index), one column per component of that type, in the step
    /// report's row order. Failed steps contribute no row.
    pub fn type_table(&self, type_name: &str, attr: &str) -> Vec<(usize, Vec<f64>)> {
        self.solved()
            .filter_map(|(step, rep)| {
                rep.tables
                    .get(type_name)
                    .map(|table| (step, table.column(attr)))
            })
            .collect()
    }
}
