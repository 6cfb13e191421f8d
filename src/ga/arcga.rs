//! ArcGA: bit-vector genetic search over additional precedence arcs
//! (spec.md §4.F). Runs after ListGA, scoring each arc-set individual by
//! simulating the ListGA-best priority list under the configured dispatch
//! policy plus the individual's additional arcs.

use super::harness::{self, FitnessOutcome};
use super::GenerationStats;
use crate::broker::BrokerStrategy;
use crate::config::Config;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ids::TaskId;
use petgraph::algo::toposort;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A bit-vector individual over the ordered candidate-arc list: `bits[i]`
/// true means "insert `candidates[i]` as an extra precedence constraint."
pub type ArcIndividual = Vec<bool>;

pub struct ArcGaResult {
    pub log: Vec<GenerationStats>,
    pub best_arcs: ArcSet,
    pub best_fitness: f64,
}

/// Enumerates every ordered pair `(u, v)`, `u != v`, with no path `u -> v`
/// or `v -> u` in the static DAG, in ascending-`TaskId` order for
/// determinism.
pub fn candidate_arcs(job: &Job) -> Vec<(TaskId, TaskId)> {
    let ids = job.task_ids();
    let (graph, index) = job.build_precedence_graph();

    let mut reachable: std::collections::HashMap<TaskId, HashSet<TaskId>> =
        std::collections::HashMap::new();
    for &id in &ids {
        let mut visited = HashSet::new();
        let mut stack = vec![index[&id]];
        while let Some(node) = stack.pop() {
            for neighbor in graph.neighbors(node) {
                let tid = graph[neighbor];
                if visited.insert(tid) {
                    stack.push(neighbor);
                }
            }
        }
        reachable.insert(id, visited);
    }

    let mut candidates = Vec::new();
    for &u in &ids {
        for &v in &ids {
            if u == v {
                continue;
            }
            if reachable[&u].contains(&v) || reachable[&v].contains(&u) {
                continue;
            }
            candidates.push((u, v));
        }
    }
    candidates
}

/// Greedily clears bits (in candidate-list order) whose inclusion closes a
/// cycle on top of the static DAG, using incremental reachability
/// (toposort-on-add) rather than a full reachability matrix per attempt.
pub(super) fn repair(bits: &mut [bool], candidates: &[(TaskId, TaskId)], job: &Job) {
    let (mut graph, index) = job.build_precedence_graph();
    for (i, &(u, v)) in candidates.iter().enumerate() {
        if !bits[i] {
            continue;
        }
        let edge = graph.add_edge(index[&u], index[&v], ());
        if toposort(&graph, None).is_err() {
            graph.remove_edge(edge);
            bits[i] = false;
        }
    }
}

fn to_arc_set(bits: &[bool], candidates: &[(TaskId, TaskId)]) -> ArcSet {
    candidates
        .iter()
        .zip(bits.iter())
        .filter(|(_, &set)| set)
        .map(|(&arc, _)| arc)
        .collect()
}

fn uniform_crossover(a: &[bool], b: &[bool], rng: &mut impl Rng) -> ArcIndividual {
    a.iter().zip(b.iter()).map(|(&x, &y)| if rng.gen_bool(0.5) { x } else { y }).collect()
}

fn bit_flip_mutate(individual: &mut [bool], rate: f64, rng: &mut impl Rng) {
    for bit in individual.iter_mut() {
        if rng.gen_bool(rate) {
            *bit = !*bit;
        }
    }
}

fn tournament_select<'a>(
    population: &'a [ArcIndividual],
    fitnesses: &[f64],
    k: u32,
    rng: &mut impl Rng,
) -> &'a [bool] {
    let mut best_idx = rng.gen_range(0..population.len());
    for _ in 1..k {
        let idx = rng.gen_range(0..population.len());
        if fitnesses[idx] < fitnesses[best_idx] {
            best_idx = idx;
        }
    }
    &population[best_idx]
}

fn evaluate_population(
    job: &Job,
    policy_name: &str,
    list: &[TaskId],
    population: &[ArcIndividual],
    candidates: &[(TaskId, TaskId)],
    strategy: &dyn BrokerStrategy,
    config: &Config,
    generation: u32,
) -> Result<Vec<FitnessOutcome>, SrcpspError> {
    let eval_one = |(idx, individual): (usize, &ArcIndividual)| {
        let arcs = to_arc_set(individual, candidates);
        harness::evaluate(
            job,
            policy_name,
            list,
            &arcs,
            strategy,
            config.mc_replications,
            config.aggregate,
            config.stochastic,
            config.seed,
            generation,
            idx as u32,
        )
    };

    #[cfg(feature = "parallel")]
    {
        population.par_iter().enumerate().map(eval_one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        population.iter().enumerate().map(eval_one).collect()
    }
}

/// Runs ArcGA to completion against a fixed priority list (the ListGA-best
/// permutation), exactly as spec.md §4.F describes: "ArcGA runs after
/// ListGA."
pub fn run(
    job: &Job,
    policy_name: &str,
    list: &[TaskId],
    strategy: &dyn BrokerStrategy,
    config: &Config,
) -> Result<ArcGaResult, SrcpspError> {
    let candidates = candidate_arcs(job);
    if candidates.is_empty() {
        let outcome = harness::evaluate(
            job,
            policy_name,
            list,
            &ArcSet::default(),
            strategy,
            config.mc_replications,
            config.aggregate,
            config.stochastic,
            config.seed,
            0,
            0,
        )?;
        return Ok(ArcGaResult { log: Vec::new(), best_arcs: ArcSet::default(), best_fitness: outcome.fitness });
    }

    let started_at = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed ^ 0xA5C_A6_ABu64);
    let mutation_rate = 1.0 / candidates.len() as f64;

    let mut population: Vec<ArcIndividual> = (0..config.arc_pop)
        .map(|_| {
            let mut bits: ArcIndividual = (0..candidates.len()).map(|_| rng.gen_bool(0.5)).collect();
            repair(&mut bits, &candidates, job);
            bits
        })
        .collect();

    let mut log = Vec::new();
    let mut best_arcs = to_arc_set(&population[0], &candidates);
    let mut best_fitness = f64::INFINITY;
    let mut stall = 0u32;

    for generation in 0..config.arc_gens {
        if let Some(budget) = config.time_budget {
            if started_at.elapsed() >= budget {
                tracing::warn!(generation, "ArcGA time budget exceeded, returning current best");
                break;
            }
        }

        let outcomes =
            evaluate_population(job, policy_name, list, &population, &candidates, strategy, config, generation)?;
        let fitnesses: Vec<f64> = outcomes.iter().map(|o| o.fitness).collect();
        let invalid_count = outcomes.iter().filter(|o| o.invalid).count() as u32;
        let stats = GenerationStats::from_fitnesses(&fitnesses, invalid_count);
        tracing::debug!(generation, min = stats.min, mean = stats.mean, "ArcGA generation");

        let (elite_idx, &elite_fitness) = fitnesses
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .expect("population is non-empty");
        if elite_fitness < best_fitness {
            best_fitness = elite_fitness;
            best_arcs = to_arc_set(&population[elite_idx], &candidates);
            stall = 0;
        } else {
            stall += 1;
        }
        log.push(stats);

        if stall >= config.stall_generations {
            tracing::debug!(generation, "ArcGA stalled, stopping early");
            break;
        }

        let elite_bits = population[elite_idx].clone();
        let mut next_generation = Vec::with_capacity(population.len());
        next_generation.push(elite_bits);
        while next_generation.len() < population.len() {
            let parent_a = tournament_select(&population, &fitnesses, config.tournament_size, &mut rng);
            let parent_b = tournament_select(&population, &fitnesses, config.tournament_size, &mut rng);
            let mut child = uniform_crossover(parent_a, parent_b, &mut rng);
            bit_flip_mutate(&mut child, mutation_rate, &mut rng);
            repair(&mut child, &candidates, job);
            next_generation.push(child);
        }
        population = next_generation;
    }

    Ok(ArcGaResult { log, best_arcs, best_fitness })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FirstFit;
    use crate::domain::{Distribution, Task};

    fn diamond_job() -> Job {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)));
        job.add_task(Task::new(TaskId(3), "T3", Distribution::Fixed(1.0)));
        job.initialize().unwrap();
        job
    }

    #[test]
    fn candidate_arcs_excludes_existing_precedence() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)).with_predecessor(TaskId(1)),
        );
        job.initialize().unwrap();

        let candidates = candidate_arcs(&job);
        assert!(!candidates.contains(&(TaskId(1), TaskId(2))));
        assert!(!candidates.contains(&(TaskId(2), TaskId(1))));
    }

    #[test]
    fn candidate_arcs_includes_both_directions_for_independent_tasks() {
        let job = diamond_job();
        let candidates = candidate_arcs(&job);
        assert!(candidates.contains(&(TaskId(1), TaskId(2))));
        assert!(candidates.contains(&(TaskId(2), TaskId(1))));
    }

    #[test]
    fn repair_clears_bits_that_would_close_a_cycle() {
        let job = diamond_job();
        let candidates = candidate_arcs(&job);
        let idx_12 = candidates.iter().position(|&a| a == (TaskId(1), TaskId(2))).unwrap();
        let idx_23 = candidates.iter().position(|&a| a == (TaskId(2), TaskId(3))).unwrap();
        let idx_31 = candidates.iter().position(|&a| a == (TaskId(3), TaskId(1))).unwrap();

        let mut bits = vec![false; candidates.len()];
        bits[idx_12] = true;
        bits[idx_23] = true;
        bits[idx_31] = true; // closes a 3-cycle with the first two

        repair(&mut bits, &candidates, &job);
        let arcs = to_arc_set(&bits, &candidates);

        // The combined static graph (empty here) + surviving arcs must stay acyclic.
        let mut combined = job.build_precedence_graph().0;
        let (_, index) = job.build_precedence_graph();
        for &(u, v) in &arcs {
            combined.add_edge(index[&u], index[&v], ());
        }
        assert!(toposort(&combined, None).is_ok());
        // At least one of the three bits must have been cleared.
        assert!(!(bits[idx_12] && bits[idx_23] && bits[idx_31]));
    }

    #[test]
    fn every_emitted_individual_stays_acyclic_across_generations() {
        let job = diamond_job();
        let config = Config { arc_pop: 10, arc_gens: 8, mc_replications: 2, ..Config::default() };
        let result = run(&job, "reference", &job.task_ids(), &FirstFit, &config).unwrap();

        let (mut combined, index) = job.build_precedence_graph();
        for &(u, v) in &result.best_arcs {
            combined.add_edge(index[&u], index[&v], ());
        }
        assert!(toposort(&combined, None).is_ok());
    }

    #[test]
    fn job_with_no_candidate_arcs_returns_an_empty_log() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)).with_predecessor(TaskId(1)),
        );
        job.initialize().unwrap();

        let config = Config::default();
        let result = run(&job, "reference", &job.task_ids(), &FirstFit, &config).unwrap();
        assert!(result.log.is_empty());
        assert!(result.best_arcs.is_empty());
    }
}
