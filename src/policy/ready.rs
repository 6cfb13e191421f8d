//! Shared ready-set and dispatchable-set computation, reused by all six
//! dispatch policies.
//!
//! "Ready" honors the static precedence DAG *and* the ArcGA-provided
//! additional arcs. "Dispatchable" further requires the broker to be able to
//! bind every required-resource slot right now.

use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;

/// All predecessors of `task`: the static DAG's `predecessors()` plus any
/// additional arc `(u, task)` from ArcGA.
pub fn predecessors_of(job: &Job, arcs: &ArcSet, task: TaskId) -> Vec<TaskId> {
    let mut preds: Vec<TaskId> = job
        .task(task)
        .map(|t| t.predecessors().to_vec())
        .unwrap_or_default();
    for &(u, v) in arcs {
        if v == task {
            preds.push(u);
        }
    }
    preds
}

/// `task` is ready iff it has not yet started and every predecessor
/// (static + additional arcs) has finished.
pub fn is_ready(job: &Job, arcs: &ArcSet, state: &SimState, task: TaskId) -> bool {
    if state.is_started(task) {
        return false;
    }
    predecessors_of(job, arcs, task)
        .into_iter()
        .all(|p| state.is_finished(p))
}

/// `list` filtered to ready tasks, preserving `list`'s relative order.
pub fn ready_set(job: &Job, arcs: &ArcSet, list: &[TaskId], state: &SimState) -> Vec<TaskId> {
    list.iter().copied().filter(|&t| is_ready(job, arcs, state, t)).collect()
}

/// Ready tasks further restricted to those the broker could bind right now,
/// preserving `list`'s relative order.
pub fn dispatchable_set(
    job: &Job,
    arcs: &ArcSet,
    list: &[TaskId],
    state: &SimState,
    strategy: &dyn BrokerStrategy,
) -> Vec<TaskId> {
    ready_set(job, arcs, list, state)
        .into_iter()
        .filter(|&t| {
            job.task(t)
                .map(|task| state.broker().can_bind(job, task, strategy))
                .unwrap_or(false)
        })
        .collect()
}
