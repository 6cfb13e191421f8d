//! ListGA: permutation-encoded genetic search over task priority lists
//! (spec.md §4.E). Individuals are random topological orders of the static
//! DAG; ArcGA's additional arcs are never applied here — ListGA sees only
//! the static graph, per spec.md §4.E's explicit note.

use super::harness::{self, FitnessOutcome};
use super::GenerationStats;
use crate::broker::BrokerStrategy;
use crate::config::Config;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ids::TaskId;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub struct ListGaResult {
    pub log: Vec<GenerationStats>,
    pub best_list: Vec<TaskId>,
    pub best_fitness: f64,
}

/// One random topological order of the job's static precedence DAG: Kahn's
/// algorithm, breaking ties among same-indegree-zero tasks uniformly at
/// random instead of by id order.
fn random_topo_order(job: &Job, rng: &mut impl Rng) -> Vec<TaskId> {
    let mut indegree: HashMap<TaskId, usize> = HashMap::new();
    let mut successors: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for (&id, _) in job.tasks() {
        indegree.entry(id).or_insert(0);
    }
    for (&id, task) in job.tasks() {
        for &pred in task.predecessors() {
            *indegree.entry(id).or_insert(0) += 1;
            successors.entry(pred).or_default().push(id);
        }
    }

    let mut ready: Vec<TaskId> =
        indegree.iter().filter(|(_, &d)| d == 0).map(|(&id, _)| id).collect();
    ready.sort();

    let mut order = Vec::with_capacity(job.task_count());
    while !ready.is_empty() {
        let idx = rng.gen_range(0..ready.len());
        let next = ready.remove(idx);
        order.push(next);
        if let Some(succs) = successors.get(&next) {
            for &succ in succs {
                let degree = indegree.get_mut(&succ).expect("successor must be indexed");
                *degree -= 1;
                if *degree == 0 {
                    ready.push(succ);
                }
            }
        }
    }
    order
}

/// Repairs a permutation that may place a task before one of its static
/// predecessors: forward-swaps the task to just after the latest such
/// predecessor. Terminates because the static graph is acyclic — each
/// repair strictly increases the offending task's index, and there is no
/// cycle of predecessors to loop through forever.
pub(super) fn repair_precedence(order: &mut Vec<TaskId>, job: &Job) {
    let n = order.len();
    let mut position: HashMap<TaskId, usize> =
        order.iter().enumerate().map(|(i, &t)| (t, i)).collect();
    let mut i = 0;
    while i < n {
        let task = order[i];
        let predecessors = job.task(task).map(|t| t.predecessors().to_vec()).unwrap_or_default();
        let violating_pos = predecessors
            .into_iter()
            .filter_map(|p| position.get(&p).copied())
            .filter(|&p| p > i)
            .max();

        if let Some(target) = violating_pos {
            order.remove(i);
            order.insert(target, task);
            position = order.iter().enumerate().map(|(idx, &t)| (t, idx)).collect();
        } else {
            i += 1;
        }
    }
}

/// Order crossover (OX): copies a random slice from `parent_a`, fills the
/// remaining positions with `parent_b`'s relative order of the tasks not in
/// that slice.
fn order_crossover(parent_a: &[TaskId], parent_b: &[TaskId], rng: &mut impl Rng) -> Vec<TaskId> {
    let n = parent_a.len();
    if n == 0 {
        return Vec::new();
    }
    let mut lo = rng.gen_range(0..n);
    let mut hi = rng.gen_range(0..n);
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }

    let segment: HashSet<TaskId> = parent_a[lo..=hi].iter().copied().collect();
    let mut child: Vec<Option<TaskId>> = vec![None; n];
    for i in lo..=hi {
        child[i] = Some(parent_a[i]);
    }
    let mut fill = parent_b.iter().copied().filter(|t| !segment.contains(t));
    for slot in &mut child {
        if slot.is_none() {
            *slot = fill.next();
        }
    }
    child.into_iter().map(|t| t.expect("OX must fill every slot")).collect()
}

fn swap_mutate(individual: &mut [TaskId], rng: &mut impl Rng) {
    if individual.len() < 2 {
        return;
    }
    let a = rng.gen_range(0..individual.len());
    let b = rng.gen_range(0..individual.len());
    individual.swap(a, b);
}

fn tournament_select<'a>(
    population: &'a [Vec<TaskId>],
    fitnesses: &[f64],
    k: u32,
    rng: &mut impl Rng,
) -> &'a [TaskId] {
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
    population: &[Vec<TaskId>],
    strategy: &dyn BrokerStrategy,
    config: &Config,
    generation: u32,
) -> Result<Vec<FitnessOutcome>, SrcpspError> {
    let arcs = ArcSet::default();
    let eval_one = |(idx, individual): (usize, &Vec<TaskId>)| {
        harness::evaluate(
            job,
            policy_name,
            individual,
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

/// Runs ListGA to completion: `config.list_gens` generations, or
/// `config.stall_generations` consecutive generations without a `min`
/// fitness improvement, or `config.time_budget` wall-clock exceeded —
/// whichever comes first.
pub fn run(
    job: &Job,
    policy_name: &str,
    strategy: &dyn BrokerStrategy,
    config: &Config,
) -> Result<ListGaResult, SrcpspError> {
    let started_at = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed);

    if job.task_count() == 0 {
        return Ok(ListGaResult { log: Vec::new(), best_list: Vec::new(), best_fitness: 0.0 });
    }

    let mut population: Vec<Vec<TaskId>> =
        (0..config.list_pop).map(|_| random_topo_order(job, &mut rng)).collect();

    let mut log = Vec::new();
    let mut best_list = population[0].clone();
    let mut best_fitness = f64::INFINITY;
    let mut stall = 0u32;

    for generation in 0..config.list_gens {
        if let Some(budget) = config.time_budget {
            if started_at.elapsed() >= budget {
                tracing::warn!(generation, "ListGA time budget exceeded, returning current best");
                break;
            }
        }

        let outcomes = evaluate_population(job, policy_name, &population, strategy, config, generation)?;
        let fitnesses: Vec<f64> = outcomes.iter().map(|o| o.fitness).collect();
        let invalid_count = outcomes.iter().filter(|o| o.invalid).count() as u32;
        let stats = GenerationStats::from_fitnesses(&fitnesses, invalid_count);
        tracing::debug!(generation, min = stats.min, mean = stats.mean, "ListGA generation");

        let (elite_idx, &elite_fitness) = fitnesses
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .expect("population is non-empty");
        if elite_fitness < best_fitness {
            best_fitness = elite_fitness;
            best_list = population[elite_idx].clone();
            stall = 0;
        } else {
            stall += 1;
        }
        log.push(stats);

        if stall >= config.stall_generations {
            tracing::debug!(generation, "ListGA stalled, stopping early");
            break;
        }

        let mut next_generation = Vec::with_capacity(population.len());
        next_generation.push(best_list.clone()); // elitism: carry the best over unconditionally
        while next_generation.len() < population.len() {
            let parent_a = tournament_select(&population, &fitnesses, config.tournament_size, &mut rng);
            let parent_b = tournament_select(&population, &fitnesses, config.tournament_size, &mut rng);
            let mut child = order_crossover(parent_a, parent_b, &mut rng);
            repair_precedence(&mut child, job);
            if rng.gen_bool(config.mutation_rate) {
                swap_mutate(&mut child, &mut rng);
                repair_precedence(&mut child, job);
            }
            next_generation.push(child);
        }
        population = next_generation;
    }

    Ok(ListGaResult { log, best_list, best_fitness })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FirstFit;
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
    fn random_topo_order_respects_precedence() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)).with_predecessor(TaskId(1)),
        );
        job.add_task(
            Task::new(TaskId(3), "T3", Distribution::Fixed(1.0)).with_predecessor(TaskId(2)),
        );
        job.initialize().unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let order = random_topo_order(&job, &mut rng);
            let pos: HashMap<TaskId, usize> =
                order.iter().enumerate().map(|(i, &t)| (t, i)).collect();
            assert!(pos[&TaskId(1)] < pos[&TaskId(2)]);
            assert!(pos[&TaskId(2)] < pos[&TaskId(3)]);
        }
    }

    #[test]
    fn repair_fixes_a_predecessor_placed_after_its_successor() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)).with_predecessor(TaskId(1)),
        );
        job.initialize().unwrap();

        let mut order = vec![TaskId(2), TaskId(1)];
        repair_precedence(&mut order, &job);
        let pos: HashMap<TaskId, usize> =
            order.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        assert!(pos[&TaskId(1)] < pos[&TaskId(2)]);
    }

    #[test]
    fn order_crossover_produces_a_valid_permutation() {
        let parent_a = vec![TaskId(1), TaskId(2), TaskId(3), TaskId(4)];
        let parent_b = vec![TaskId(4), TaskId(3), TaskId(2), TaskId(1)];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let child = order_crossover(&parent_a, &parent_b, &mut rng);
            let mut sorted = child.clone();
            sorted.sort();
            assert_eq!(sorted, vec![TaskId(1), TaskId(2), TaskId(3), TaskId(4)]);
        }
    }

    #[test]
    fn min_fitness_is_non_increasing_across_generations() {
        let job = bottleneck_job(8);
        let config = Config {
            list_pop: 16,
            list_gens: 15,
            mc_replications: 3,
            stall_generations: 100,
            seed: 0,
            ..Config::default()
        };
        let result = run(&job, "reference", &FirstFit, &config).unwrap();
        let mut running_min = f64::INFINITY;
        for stats in &result.log {
            assert!(stats.min <= running_min + 1e-9);
            running_min = running_min.min(stats.min);
        }
    }
}
