//! Discrete-event simulator: the fill/advance loop driving one dispatch
//! policy over one (list, arcs) schedule under sampled task durations.
//!
//! Re-architected from `original_source/deepThought/simulator/simulator.py`'s
//! coroutine-per-task `simpy` loop into plain events on a binary heap
//! (spec.md §9's explicit redesign instruction) — there is no coroutine
//! primitive to reach for here, and a heap keyed by finish time is the
//! idiomatic Rust equivalent.

pub mod event;
pub mod result;
pub mod state;

use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ids::TaskId;
use crate::policy::DispatchPolicy;
use event::FinishEvent;
use rand::Rng;
use result::{SimulationResult, TaskRecord};
use state::SimState;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub struct Simulator;

impl Simulator {
    /// Runs one simulation to completion: fill the ready set, advance to the
    /// next finish, repeat until the event queue empties. Returns
    /// `DeadlockError` (not a panic) if tasks remain unstarted when the
    /// queue runs dry.
    ///
    /// `stochastic = false` draws every task's duration from its mean
    /// instead of sampling its distribution (Config's `stochastic` option),
    /// turning the run into the FIXED-distribution case spec.md §8's
    /// end-to-end scenarios rely on for a deterministic makespan.
    pub fn run(
        job: &Job,
        list: &[TaskId],
        arcs: &ArcSet,
        policy: &mut dyn DispatchPolicy,
        strategy: &dyn BrokerStrategy,
        rng: &mut impl Rng,
        stochastic: bool,
    ) -> Result<SimulationResult, SrcpspError> {
        tracing::debug!(tasks = job.task_count(), policy = policy.name(), "simulation start");

        policy.reset();
        policy.initialize(list, arcs);
        let mut state = SimState::new(job);
        let mut heap: BinaryHeap<Reverse<FinishEvent>> = BinaryHeap::new();
        let mut seq: u64 = 0;

        loop {
            while policy.has_next(job, &state, strategy) {
                let Some(task_id) = policy.get_next(job, &mut state, strategy) else {
                    break;
                };
                let task = job.task(task_id).expect("dispatched task must exist in job");
                let bound = state
                    .broker_mut()
                    .try_bind(job, task, strategy)
                    .expect("policy must only dispatch tasks the broker can bind");
                state.mark_started(task_id, bound);

                let duration = if stochastic { task.sample_duration(rng) } else { task.mean_duration() };
                let finish_time = state.current_time() + duration;
                heap.push(Reverse(FinishEvent { time: finish_time, seq, task: task_id }));
                seq += 1;
            }

            let Some(Reverse(event)) = heap.pop() else {
                break;
            };
            state.advance_to(event.time);
            let released = state.mark_finished(event.task);
            state.broker_mut().release(&released);
            policy.on_finished(event.task, &mut state);
        }

        let total_tasks = job.task_count();
        if state.finished_count() != total_tasks {
            let remaining = state.unstarted_tasks();
            tracing::warn!(remaining = remaining.len(), "simulation deadlocked");
            return Err(SrcpspError::DeadlockError {
                remaining: remaining.len(),
                tasks: remaining,
            });
        }

        let mut execution_history = Vec::with_capacity(total_tasks);
        let mut total_time = 0.0_f64;
        for (&task_id, task) in job.tasks() {
            let started = state.start_time(task_id).unwrap_or(0.0);
            let finished = state.finish_time(task_id).unwrap_or(0.0);
            total_time = total_time.max(finished);
            execution_history.push(TaskRecord {
                id: task_id,
                name: task.name().to_string(),
                started,
                finished,
                execution_time: finished - started,
                used_resources: state.used_resources(task_id).to_vec(),
            });
        }

        // Chronological dispatch order, not arena (ascending-TaskId) order —
        // spec.md's reporter contract tracks execution as it happened.
        execution_history.sort_by(|a, b| a.started.total_cmp(&b.started).then(a.id.cmp(&b.id)));

        tracing::debug!(total_time, "simulation end");
        Ok(SimulationResult { total_time, execution_history })
    }
}
