//! Crate-level entry points (spec.md §6's "Invocation surface"):
//! `simulate`, `optimize`, `precompute`. Each validates its inputs before
//! doing any work and returns `SrcpspError` rather than panicking.

use crate::broker::FirstFit;
use crate::config::Config;
use crate::domain::Job;
use crate::error::SrcpspError;
use crate::ids::TaskId;
use crate::optimizer::{self, OptimizeResult};
use crate::policy;
use crate::simulator::result::SimulationResult;
use crate::simulator::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Runs one simulation of `job` under `policy_name`, using the job's
/// schedule artifacts (priority list + additional arcs) if the optimizer
/// has populated them, falling back to ascending-`TaskId` order and no
/// additional arcs otherwise.
pub fn simulate(
    job: &Job,
    policy_name: &str,
    seed: Option<u64>,
) -> Result<SimulationResult, SrcpspError> {
    if !job.already_initialized() {
        return Err(SrcpspError::LoadError("job must be initialized before simulate".into()));
    }

    let seed = seed.unwrap_or(0);
    let list: Vec<TaskId> = job
        .schedule_artifacts()
        .map(|a| a.priority_list.clone())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| job.task_ids());
    let arcs = job.schedule_artifacts().map(|a| a.arcs.clone()).unwrap_or_default();

    let mut dispatcher = policy::build(policy_name, seed)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Simulator::run(job, &list, &arcs, dispatcher.as_mut(), &FirstFit, &mut rng, true)
}

/// Runs the two-layer GA optimizer (ListGA, then ArcGA) and returns both
/// generation logs, the best (list, arcs) pair, and the `SimulationResult`
/// of simulating that pair once more.
pub fn optimize(job: &Job, config: &Config) -> Result<OptimizeResult, SrcpspError> {
    if !job.already_initialized() {
        return Err(SrcpspError::LoadError("job must be initialized before optimize".into()));
    }
    optimizer::optimize(job, config)
}

/// Precompute mode (spec.md §6): fills every task's `pre_computed_execution_times`
/// buffer with `samples_per_task` draws from a seeded RNG. Does not touch
/// the optimizer or simulator. Idempotent for a fixed `(samples_per_task,
/// seed)`: task iteration order is deterministic (`Job`'s task arena is a
/// `BTreeMap`), so a second run with the same inputs overwrites each
/// buffer with a byte-equal sample sequence.
pub fn precompute(job: &mut Job, samples_per_task: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for (_, task) in job.tasks_mut() {
        task.fill_precomputed_execution_times(samples_per_task, &mut rng);
    }
}
