//! End-to-end timeseries runs over small networks.

use mf_core::{Eid, StepState};
use mf_graph::Network;
use mf_models::{RampGenerator, express};
use mf_sim::{
    RunOptions, SimError, StepErrorPolicy, StepHook, StepOutcome, TimeseriesData, run,
};
use mf_solver::{NewtonBackend, SolverError};

fn two_bus() -> (Network, mf_core::ChildId, mf_core::ChildId) {
    let mut net = Network::new();
    let grid = express::power_grid(&mut net);
    let feed = express::bus(&mut net, grid, 1.0);
    let city = express::bus(&mut net, grid, 1.0);
    express::line(&mut net, grid, feed, city, 100.0).unwrap();
    let ext = express::ext_power_grid(&mut net, feed).unwrap();
    let load = express::power_load(&mut net, city, 0.1, 0.0).unwrap();
    (net, ext, load)
}

#[test]
fn load_series_drives_the_slack() {
    let (net, ext, load) = two_bus();
    let mut data = TimeseriesData::new();
    data.add_child_series(load, "p_mw", vec![0.05, 0.1]).unwrap();

    let result = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions::default(),
        &mut [],
    )
    .unwrap();

    assert_eq!(result.num_solved(), 2);
    let series = result.series(Eid::Child(ext), "p_mw");
    let p0 = series[0].unwrap();
    let p1 = series[1].unwrap();
    assert!((p0 + 0.05).abs() < 2e-3, "step 0 slack {p0}");
    assert!((p1 + 0.1).abs() < 2e-3, "step 1 slack {p1}");

    // Records are inspectable, report included.
    assert!(format!("{:?}", result.steps[0].outcome).starts_with("Solved"));

    // Table view: one row per solved step, one voltage column per bus.
    let table = result.type_table("Bus", "vm_pu");
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].0, 0);
    assert_eq!(table[0].1.len(), 2);
    assert!(table.iter().all(|(_, vm)| vm.iter().all(|v| *v > 0.9 && *v <= 1.0)));
}

#[test]
fn requesting_more_steps_than_the_series_carry_fails() {
    let (net, _, load) = two_bus();
    let mut data = TimeseriesData::new();
    data.add_child_series(load, "p_mw", vec![0.05]).unwrap();

    let err = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions {
            steps: Some(3),
            ..RunOptions::default()
        },
        &mut [],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SimError::StepsExceedSeries {
            steps: 3,
            available: 1
        }
    ));
}

#[derive(Default)]
struct Counter {
    pre: usize,
    solved: usize,
    failed: usize,
}

impl StepHook for Counter {
    fn pre_run(
        &mut self,
        _work: &mut Network,
        _base: &mut Network,
        _state: Option<&StepState>,
        _step: usize,
    ) {
        self.pre += 1;
    }

    fn post_run(
        &mut self,
        outcome: &StepOutcome,
        _base: &mut Network,
        _state: Option<&StepState>,
        _step: usize,
    ) {
        match outcome {
            StepOutcome::Solved(_) => self.solved += 1,
            StepOutcome::Failed(_) => self.failed += 1,
            StepOutcome::Skipped => {}
        }
    }
}

#[test]
fn dry_run_injects_without_solving() {
    let (net, _, load) = two_bus();
    let mut data = TimeseriesData::new();
    data.add_child_series(load, "p_mw", vec![0.05, 0.1, 0.2])
        .unwrap();

    let mut counter = Counter::default();
    let result = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions {
            solve: false,
            ..RunOptions::default()
        },
        &mut [&mut counter],
    )
    .unwrap();

    assert_eq!(result.steps.len(), 3);
    assert!(
        result
            .steps
            .iter()
            .all(|r| matches!(r.outcome, StepOutcome::Skipped))
    );
    assert_eq!(counter.pre, 3);
    assert_eq!(counter.solved + counter.failed, 0);
}

/// Writes a reactive setpoint onto the base network after the first solve;
/// later steps must pick it up through their copies.
struct NudgeBase {
    load: mf_core::ChildId,
}

impl StepHook for NudgeBase {
    fn post_run(
        &mut self,
        outcome: &StepOutcome,
        base: &mut Network,
        _state: Option<&StepState>,
        step: usize,
    ) {
        if step == 0 && matches!(outcome, StepOutcome::Solved(_)) {
            base.child_mut(self.load)
                .unwrap()
                .model
                .set_attr("q_mvar", 0.02);
        }
    }
}

#[test]
fn hooks_can_carry_values_through_the_base_network() {
    let (net, ext, load) = two_bus();
    let mut data = TimeseriesData::new();
    data.add_child_series(load, "p_mw", vec![0.05, 0.05]).unwrap();

    let mut hook = NudgeBase { load };
    let result = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions::default(),
        &mut [&mut hook],
    )
    .unwrap();

    let q = result.series(Eid::Child(ext), "q_mvar");
    assert!(q[0].unwrap().abs() < 1e-3, "step 0 reactive {:?}", q[0]);
    assert!((q[1].unwrap() + 0.02).abs() < 1e-3, "step 1 reactive {:?}", q[1]);

    // The caller's network is never touched, only the run's own base copy.
    let original = net.child(load).unwrap().model.attr("q_mvar").unwrap().value();
    assert_eq!(original, 0.0);
}

fn ramp_net() -> (Network, mf_core::ChildId) {
    let mut net = Network::new();
    let grid = express::power_grid(&mut net);
    let bus = express::bus(&mut net, grid, 1.0);
    express::ext_power_grid(&mut net, bus).unwrap();
    let ramp = net
        .add_child(bus, Box::new(RampGenerator::new(1.0, 0.05, 0.05)))
        .unwrap();
    (net, ramp)
}

#[test]
fn ramp_constraints_exceed_the_newton_backend() {
    // Step 0 carries no previous output and solves; from step 1 on the
    // ramp limits arrive as inequalities, which Newton rejects.
    let (net, ramp) = ramp_net();
    let mut data = TimeseriesData::new();
    data.add_child_series(ramp, "p_mw", vec![-0.2, -0.3]).unwrap();

    let err = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions::default(),
        &mut [],
    )
    .unwrap_err();
    match err {
        SimError::Step { step, source } => {
            assert_eq!(step, 1);
            assert!(matches!(source, SolverError::Unsupported { .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn skip_policy_records_failures_and_continues() {
    let (net, ramp) = ramp_net();
    let mut data = TimeseriesData::new();
    data.add_child_series(ramp, "p_mw", vec![-0.2, -0.3, -0.3])
        .unwrap();

    let mut counter = Counter::default();
    let result = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions {
            on_step_error: StepErrorPolicy::Skip,
            ..RunOptions::default()
        },
        &mut [&mut counter],
    )
    .unwrap();

    // The failed steps never refresh the carried state, so every later
    // step still sees step 0's output and keeps failing. Hooks observe
    // the failures as they happen.
    assert_eq!(result.steps.len(), 3);
    assert_eq!(result.num_solved(), 1);
    assert_eq!(result.num_failed(), 2);
    assert_eq!(counter.solved, 1);
    assert_eq!(counter.failed, 2);
    let series = result.series(Eid::Child(ramp), "p_mw");
    assert!((series[0].unwrap() + 0.2).abs() < 1e-9);
    assert_eq!(series[1], None);
    assert_eq!(series[2], None);
}

#[test]
fn pruned_components_leave_no_inter_step_state() {
    // The ramp generator sits on its own bus behind an open tie. While the
    // tie is open its island is pruned and never solved; once the tie
    // closes, the step must solve plainly, with no ramp history from a
    // value that was injected but never computed.
    let mut net = Network::new();
    let grid = express::power_grid(&mut net);
    let feed = express::bus(&mut net, grid, 1.0);
    let island = express::bus(&mut net, grid, 1.0);
    let tie = express::line(&mut net, grid, feed, island, 100.0).unwrap();
    let ext = express::ext_power_grid(&mut net, feed).unwrap();
    let ramp = net
        .add_child(island, Box::new(RampGenerator::new(1.0, 0.05, 0.05)))
        .unwrap();

    let mut data = TimeseriesData::new();
    data.add_branch_series(tie, "on_off", vec![0.0, 1.0]).unwrap();
    data.add_child_series(ramp, "p_mw", vec![-0.2, -0.2]).unwrap();

    let result = run(
        &net,
        &data,
        &mf_formulation::standard(),
        &NewtonBackend::default(),
        &RunOptions::default(),
        &mut [],
    )
    .unwrap();

    assert_eq!(result.num_solved(), 2);
    // Step 0: the island never made it into the system.
    let report0 = result.steps[0].report().unwrap();
    assert!(report0.ignored.contains(&island));
    // Step 1: the generator's output reaches the slack.
    let p1 = result.series(Eid::Child(ext), "p_mw")[1].unwrap();
    assert!((p1 - 0.2).abs() < 2e-3, "step 1 slack {p1}");
}
