//! Top-level optimizer orchestration: runs ListGA, then ArcGA against its
//! best priority list, optionally alternating both for `config.arc_rounds`
//! outer rounds (spec.md §4.F: "some implementations alternate"), then
//! simulates the final (list, arcs) pair once more to produce the reported
//! `SimulationResult`.

use crate::broker::FirstFit;
use crate::config::Config;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ga::harness::mix_seed;
use crate::ga::{arcga, listga, GenerationStats};
use crate::ids::TaskId;
use crate::policy;
use crate::simulator::result::SimulationResult;
use crate::simulator::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct OptimizeResult {
    pub list_log: Vec<GenerationStats>,
    pub arc_log: Vec<GenerationStats>,
    pub best_result: SimulationResult,
    pub best_list: Vec<TaskId>,
    pub best_arcs: ArcSet,
}

/// Runs the two-layer GA optimizer. `config.arc_rounds == 1` (the default)
/// runs ListGA once, then ArcGA once against its output — no alternation.
/// `arc_rounds > 1` re-runs both stages that many times, each round seeded
/// from a deterministic mix of `(config.seed, round)` so the rounds explore
/// distinct search trajectories while the whole run stays reproducible.
pub fn optimize(job: &Job, config: &Config) -> Result<OptimizeResult, SrcpspError> {
    let strategy = FirstFit;
    let mut best_list: Vec<TaskId> = job.task_ids();
    let mut best_arcs = ArcSet::default();
    let mut list_log = Vec::new();
    let mut arc_log = Vec::new();

    for round in 0..config.arc_rounds {
        let round_seed = mix_seed(config.seed, round, 0, 0);
        let round_config = Config { seed: round_seed, ..config.clone() };

        let list_result = listga::run(job, &config.policy, &strategy, &round_config)?;
        best_list = list_result.best_list;
        list_log = list_result.log;

        let arc_result = arcga::run(job, &config.policy, &best_list, &strategy, &round_config)?;
        best_arcs = arc_result.best_arcs;
        arc_log = arc_result.log;

        tracing::info!(
            round,
            list_best = list_result.best_fitness,
            arc_best = arc_result.best_fitness,
            "optimizer round complete"
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut dispatcher = policy::build(&config.policy, config.seed)?;
    let best_result = Simulator::run(
        job,
        &best_list,
        &best_arcs,
        dispatcher.as_mut(),
        &strategy,
        &mut rng,
        config.stochastic,
    )?;

    Ok(OptimizeResult { list_log, arc_log, best_result, best_list, best_arcs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Capability, Distribution, RequiredResource, Resource, Task};

    fn bottleneck_job(n: u32) -> Job {
        let mut job = Job::new();
        job.add_capability(Capability::new("C", "cap"));
        job.add_resource(Resource::new("R1", "r1", 1).with_capability("C"));
        for i in 1..=n {
            let task = Task::new(TaskId(i), format!("T{i}"), Distribution::Fixed(1.0))
                .with_required_resource(RequiredResource::new(vec!["C".to_string()], 1));
            job.add_task(task);
        }
        job.initialize().unwrap();
        job
    }

    #[test]
    fn optimize_returns_a_schedule_that_simulates_cleanly() {
        let job = bottleneck_job(6);
        let config = Config {
            list_pop: 10,
            list_gens: 5,
            arc_pop: 10,
            arc_gens: 5,
            mc_replications: 3,
            ..Config::default()
        };
        let result = optimize(&job, &config).unwrap();
        assert_eq!(result.best_list.len(), 6);
        assert_eq!(result.best_result.execution_history.len(), 6);
        assert!(result.best_result.total_time > 0.0);
        assert!(!result.list_log.is_empty());
    }

    #[test]
    fn unknown_policy_name_surfaces_as_a_config_error() {
        let job = bottleneck_job(3);
        let config = Config { policy: "not-a-policy".to_string(), ..Config::default() };
        let err = optimize(&job, &config).unwrap_err();
        assert!(matches!(err, SrcpspError::ConfigError(_)));
    }
}
