//! PPPolicies: one-step look-ahead earliest-start-time heuristic. Picks the
//! dispatchable task whose resource binding leaves the fewest other ready
//! tasks unable to bind immediately afterward, ties by priority-list order.

use super::ready::{dispatchable_set, ready_set};
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PPPolicies {
    list: Vec<TaskId>,
    arcs: ArcSet,
    position: HashMap<TaskId, usize>,
}

impl PPPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of other ready tasks that could not be bound if `candidate` is
    /// bound first, under the current broker state.
    fn lockout_count(
        &self,
        job: &Job,
        state: &SimState,
        strategy: &dyn BrokerStrategy,
        candidate: TaskId,
        remaining_ready: &[TaskId],
    ) -> usize {
        let task = job.task(candidate).expect("candidate task must exist");
        let mut probe_broker = state.broker().clone();
        if probe_broker.try_bind(job, task, strategy).is_none() {
            return usize::MAX; // not actually bindable; sorts last
        }
        remaining_ready
            .iter()
            .filter(|&&r| r != candidate)
            .filter(|&&r| {
                let other = job.task(r).expect("ready task must exist");
                !probe_broker.can_bind(job, other, strategy)
            })
            .count()
    }
}

impl DispatchPolicy for PPPolicies {
    fn initialize(&mut self, list: &[TaskId], arcs: &ArcSet) {
        self.list = list.to_vec();
        self.arcs = arcs.clone();
        self.position = list.iter().enumerate().map(|(i, &t)| (t, i)).collect();
    }

    fn reset(&mut self) {}

    fn has_next(&self, job: &Job, state: &SimState, strategy: &dyn BrokerStrategy) -> bool {
        !dispatchable_set(job, &self.arcs, &self.list, state, strategy).is_empty()
    }

    fn get_next(
        &mut self,
        job: &Job,
        state: &mut SimState,
        strategy: &dyn BrokerStrategy,
    ) -> Option<TaskId> {
        let candidates = dispatchable_set(job, &self.arcs, &self.list, state, strategy);
        let remaining_ready = ready_set(job, &self.arcs, &self.list, state);

        candidates
            .into_iter()
            .map(|t| {
                let lockout = self.lockout_count(job, state, strategy, t, &remaining_ready);
                let pos = self.position.get(&t).copied().unwrap_or(usize::MAX);
                (t, (lockout, pos))
            })
            .min_by_key(|&(_, key)| key)
            .map(|(t, _)| t)
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "pp"
    }
}
