//! The sequential timeseries driver.

use crate::data::TimeseriesData;
use crate::error::{SimError, SimResult};
use crate::result::{StepOutcome, StepRecord, TimeseriesResult};
use mf_core::{Attr, StepState};
use mf_formulation::{NetworkFormulation, branch_ignored, child_ignored, compound_ignored, node_ignored};
use mf_graph::Network;
use mf_solver::{SolverBackend, solve_with_state};
use tracing::{info, warn};

/// What to do when a step's solve fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepErrorPolicy {
    /// Abort the run with [`SimError::Step`].
    #[default]
    Raise,
    /// Record the failure and continue; the failed step contributes no
    /// inter-step state.
    Skip,
}

#[derive(Debug)]
pub struct RunOptions {
    /// Steps to run; defaults to the full series length.
    pub steps: Option<usize>,
    pub on_step_error: StepErrorPolicy,
    /// With `solve: false` the run injects each step and fires pre hooks but
    /// never calls the backend (a dry run over the data).
    pub solve: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            steps: None,
            on_step_error: StepErrorPolicy::default(),
            solve: true,
        }
    }
}

/// Observes and steers the run.
///
/// `pre_run` fires after injection, with the step's working network, the
/// run's base network and the inter-step state so far; `post_run` fires
/// after every attempted solve with the step's outcome. The base network is
/// mutable in both: writing values onto it (say, a solved state for
/// warm-starting) carries into every later step's copy. The caller's own
/// network stays untouched either way.
pub trait StepHook {
    fn pre_run(
        &mut self,
        _work: &mut Network,
        _base: &mut Network,
        _state: Option<&StepState>,
        _step: usize,
    ) {
    }

    fn post_run(
        &mut self,
        _outcome: &StepOutcome,
        _base: &mut Network,
        _state: Option<&StepState>,
        _step: usize,
    ) {
    }
}

/// Runs the series step by step: inject, solve against the previous step's
/// state, extract the new state from the solved network. Failed and dry
/// steps never advance the state; under the raise policy a failure aborts
/// before any post hook fires.
pub fn run(
    net: &Network,
    data: &TimeseriesData,
    form: &NetworkFormulation,
    backend: &dyn SolverBackend,
    options: &RunOptions,
    hooks: &mut [&mut dyn StepHook],
) -> SimResult<TimeseriesResult> {
    let available = data.len().unwrap_or(0);
    let steps = options.steps.unwrap_or(available);
    if steps > available {
        return Err(SimError::StepsExceedSeries { steps, available });
    }

    let mut base = net.clone();
    let mut result = TimeseriesResult::default();
    let mut state: Option<StepState> = None;

    for step in 0..steps {
        let mut work = base.clone();
        data.apply(&mut work, step)?;
        for hook in hooks.iter_mut() {
            hook.pre_run(&mut work, &mut base, state.as_ref(), step);
        }

        if !options.solve {
            result.steps.push(StepRecord {
                step,
                outcome: StepOutcome::Skipped,
            });
            continue;
        }

        let outcome = match solve_with_state(&work, form, backend, state.as_ref()) {
            Ok(report) => {
                state = Some(extract_state(&report));
                StepOutcome::Solved(report)
            }
            Err(source) => match options.on_step_error {
                StepErrorPolicy::Raise => return Err(SimError::Step { step, source }),
                StepErrorPolicy::Skip => {
                    warn!(step, error = %source, "step failed; skipping");
                    StepOutcome::Failed(source)
                }
            },
        };
        for hook in hooks.iter_mut() {
            hook.post_run(&outcome, &mut base, state.as_ref(), step);
        }
        result.steps.push(StepRecord { step, outcome });
    }

    info!(
        steps,
        solved = result.num_solved(),
        failed = result.num_failed(),
        "timeseries run finished"
    );
    Ok(result)
}

/// Collects the carried state of a solved network: every tracked variable
/// plus each model's declared inter-step variables. Components the solve
/// ignored contribute nothing; their attributes were never solved, and a
/// missing entry is how inter-step equations know to omit history
/// constraints.
fn extract_state(report: &mf_solver::SolveReport) -> StepState {
    let net = &report.network;
    let ignored = &report.ignored;
    let mut state = StepState::new();
    let mut collect = |eid: mf_core::Eid, model: &dyn mf_graph::ModelCommon| {
        let carried = model.inter_step_vars();
        model.visit_attrs(&mut |name, attr| {
            let tracked = matches!(attr, Attr::Var(spec) if spec.tracked);
            if tracked || carried.contains(&name) {
                state.set(eid, name, attr.value());
            }
        });
    };
    for node in net.nodes() {
        if !node_ignored(net, node, ignored) {
            collect(node.eid(), node.model.as_ref());
        }
    }
    for branch in net.branches() {
        if !branch_ignored(net, branch, ignored) {
            collect(branch.eid(), branch.model.as_ref());
        }
    }
    for child in net.childs() {
        if !child_ignored(net, child, ignored) {
            collect(child.eid(), child.model.as_ref());
        }
    }
    for compound in net.compounds() {
        if !compound_ignored(net, compound, ignored) {
            collect(compound.eid(), compound.model.as_ref());
        }
    }
    state
}
