//! Property tests for the crate's quantified invariants.

use std::collections::HashMap;

use srcpsp::domain::{ArcSet, Capability, Distribution, Job, RequiredResource, Resource, Task};
use srcpsp::{optimize, simulate, Config, TaskId};

/// Sweeps a simulation's `execution_history` and returns, per resource id,
/// the maximum number of tasks holding it concurrently.
fn peak_concurrent_holders(result: &srcpsp::SimulationResult) -> HashMap<String, u32> {
    let mut events: HashMap<String, Vec<(f64, i32)>> = HashMap::new();
    for record in &result.execution_history {
        for resource_id in &record.used_resources {
            let slot = events.entry(resource_id.clone()).or_default();
            slot.push((record.started, 1));
            slot.push((record.finished, -1));
        }
    }
    let mut peaks = HashMap::new();
    for (resource_id, mut slot) in events {
        slot.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(b.1.cmp(&a.1)));
        let mut running = 0i32;
        let mut peak = 0i32;
        for (_, delta) in slot {
            running += delta;
            peak = peak.max(running);
        }
        peaks.insert(resource_id, peak as u32);
    }
    peaks
}

fn three_way_bottleneck(capacity: u32) -> Job {
    let mut job = Job::new();
    job.add_capability(Capability::new("C", "generic"));
    job.add_resource(Resource::new("R1", "r1", capacity).with_capability("C"));
    for i in 1..=3u32 {
        job.add_task(
            Task::new(TaskId(i), format!("T{i}"), Distribution::Fixed(10.0))
                .with_required_resource(RequiredResource::new(vec!["C".to_string()], 1)),
        );
    }
    job.initialize().unwrap();
    job
}

/// Invariant 1: a resource's concurrent holder count never exceeds its
/// `max_share_count`, for every dispatch policy.
#[test]
fn share_count_is_never_exceeded() {
    let job = three_way_bottleneck(2);
    for policy in ["reference", "optimized_dependency", "rbrs"] {
        let result = simulate(&job, policy, Some(1)).unwrap();
        let peaks = peak_concurrent_holders(&result);
        assert!(peaks["R1"] <= 2, "policy {policy} exceeded capacity: {peaks:?}");
    }
}

/// Invariant 2: every predecessor finishes no later than its successor
/// starts.
#[test]
fn predecessors_finish_before_successors_start() {
    let mut job = Job::new();
    job.add_capability(Capability::new("CA", "a"));
    job.add_capability(Capability::new("CB", "b"));
    job.add_resource(Resource::new("RA", "ra", 1).with_capability("CA"));
    job.add_resource(Resource::new("RB", "rb", 1).with_capability("CB"));
    job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(5.0)));
    job.add_task(
        Task::new(TaskId(2), "T2", Distribution::Fixed(10.0))
            .with_predecessor(TaskId(1))
            .with_required_resource(RequiredResource::new(vec!["CA".to_string()], 1)),
    );
    job.add_task(
        Task::new(TaskId(3), "T3", Distribution::Fixed(8.0))
            .with_predecessor(TaskId(1))
            .with_required_resource(RequiredResource::new(vec!["CB".to_string()], 1)),
    );
    job.add_task(
        Task::new(TaskId(4), "T4", Distribution::Fixed(2.0))
            .with_predecessor(TaskId(2))
            .with_predecessor(TaskId(3)),
    );
    job.initialize().unwrap();

    let result = simulate(&job, "reference", Some(3)).unwrap();
    let by_id: HashMap<TaskId, (f64, f64)> = result
        .execution_history
        .iter()
        .map(|r| (r.id, (r.started, r.finished)))
        .collect();

    for (&task_id, task) in job.tasks() {
        for &predecessor in task.predecessors() {
            let (_, pred_finish) = by_id[&predecessor];
            let (succ_start, _) = by_id[&task_id];
            assert!(
                pred_finish <= succ_start,
                "predecessor {predecessor} finished at {pred_finish} after successor {task_id} started at {succ_start}"
            );
        }
    }
}

/// Invariant 3: every task appears exactly once in `execution_history`,
/// with `started <= finished`.
#[test]
fn every_task_appears_exactly_once_and_in_order() {
    let job = three_way_bottleneck(1);
    let result = simulate(&job, "reference", Some(4)).unwrap();

    assert_eq!(result.execution_history.len(), job.task_count());
    let mut seen = std::collections::HashSet::new();
    for record in &result.execution_history {
        assert!(seen.insert(record.id), "task {} appeared more than once", record.id);
        assert!(record.started <= record.finished);
    }
}

/// Invariant 4: simulating the same `(job, policy, seed)` twice is
/// byte-for-byte deterministic.
#[test]
fn identical_inputs_reproduce_identical_results() {
    let job = three_way_bottleneck(2);
    let a = simulate(&job, "rbrs", Some(99)).unwrap();
    let b = simulate(&job, "rbrs", Some(99)).unwrap();
    assert_eq!(a, b);
}

/// Invariant 5: ListGA's per-generation `min` fitness never increases
/// across generations (elitism).
#[test]
fn listga_min_fitness_is_non_increasing() {
    let job = three_way_bottleneck(1);
    let config = Config {
        list_pop: 20,
        list_gens: 30,
        stall_generations: 30,
        mc_replications: 1,
        stochastic: false,
        seed: 5,
        ..Config::default()
    };
    let result = srcpsp::ga::listga::run(&job, &config.policy, &srcpsp::broker::FirstFit, &config)
        .unwrap();

    for pair in result.log.windows(2) {
        assert!(pair[1].min <= pair[0].min, "min fitness increased: {:?} -> {:?}", pair[0], pair[1]);
    }
}

/// Invariant 6: every additional-arcs individual ArcGA repairs and keeps in
/// its population, layered on top of the static graph, stays acyclic.
#[test]
fn arcga_best_arcs_stay_acyclic_with_the_static_graph() {
    let mut job = Job::new();
    job.add_capability(Capability::new("C", "generic"));
    job.add_resource(Resource::new("R1", "r1", 1).with_capability("C"));
    for i in 1..=6u32 {
        job.add_task(
            Task::new(TaskId(i), format!("T{i}"), Distribution::Fixed(1.0))
                .with_required_resource(RequiredResource::new(vec!["C".to_string()], 1)),
        );
    }
    job.initialize().unwrap();

    let config = Config {
        arc_pop: 15,
        arc_gens: 10,
        mc_replications: 1,
        stochastic: false,
        seed: 11,
        ..Config::default()
    };
    let list = job.task_ids();
    let result =
        srcpsp::ga::arcga::run(&job, &config.policy, &list, &srcpsp::broker::FirstFit, &config)
            .unwrap();

    assert!(acyclic_with_arcs(&job, &result.best_arcs));
}

fn acyclic_with_arcs(job: &Job, arcs: &ArcSet) -> bool {
    let (mut graph, index) = job.build_precedence_graph();
    for &(from, to) in arcs {
        graph.add_edge(index[&from], index[&to], ());
    }
    petgraph::algo::toposort(&graph, None).is_ok()
}

/// Invariant 7: precompute fills a reproducible sample sequence for a fixed
/// `(samples_per_task, seed)`, independent of how many times it's called.
#[test]
fn precompute_reproduces_the_same_buffer_for_the_same_seed() {
    let job_template = three_way_bottleneck(2);
    let mut job_a = job_template.clone();
    let mut job_b = job_template.clone();

    srcpsp::precompute(&mut job_a, 25, 123);
    srcpsp::precompute(&mut job_b, 25, 123);

    for ((_, a), (_, b)) in job_a.tasks().zip(job_b.tasks()) {
        assert_eq!(a.precomputed_execution_times().as_slice(), b.precomputed_execution_times().as_slice());
    }
}

/// Regression guard tying invariant 6 to the full optimizer path.
#[test]
fn optimize_end_to_end_never_returns_a_cyclic_schedule() {
    let job = three_way_bottleneck(1);
    let config = Config {
        list_pop: 10,
        list_gens: 5,
        arc_pop: 10,
        arc_gens: 5,
        mc_replications: 2,
        seed: 21,
        ..Config::default()
    };
    let result = optimize(&job, &config).unwrap();
    assert!(acyclic_with_arcs(&job, &result.best_arcs));
}
