//! OptimizedDependency: dispatchable tasks reordered by how many successors
//! they would newly make ready, ties broken by priority-list position then
//! `TaskId`. Resolves spec.md's open question on this policy's tie-break.

use super::critical_path::successors_of;
use super::ready::dispatchable_set;
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct OptimizedDependency {
    list: Vec<TaskId>,
    arcs: ArcSet,
    position: HashMap<TaskId, usize>,
}

impl OptimizedDependency {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many successors of `task` would have every other predecessor
    /// already finished once `task` finishes too.
    fn newly_ready_count(&self, job: &Job, state: &SimState, task: TaskId) -> usize {
        successors_of(job, &self.arcs, task)
            .into_iter()
            .filter(|&s| {
                super::ready::predecessors_of(job, &self.arcs, s)
                    .into_iter()
                    .filter(|&p| p != task)
                    .all(|p| state.is_finished(p))
            })
            .count()
    }

    fn rank_key(&self, job: &Job, state: &SimState, task: TaskId) -> (i64, usize, TaskId) {
        let newly_ready = self.newly_ready_count(job, state, task) as i64;
        let pos = self.position.get(&task).copied().unwrap_or(usize::MAX);
        (-newly_ready, pos, task)
    }
}

impl DispatchPolicy for OptimizedDependency {
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
        let mut candidates = dispatchable_set(job, &self.arcs, &self.list, state, strategy);
        candidates.sort_by_key(|&t| self.rank_key(job, state, t));
        candidates.into_iter().next()
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "optimized_dependency"
    }
}
