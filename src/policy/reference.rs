//! Reference policy: first in priority-list order among ready+dispatchable
//! tasks. The simplest baseline, analogous to the teacher's
//! `algorithms::rl::policy::random` occupying the "do the simplest possible
//! thing" slot in the registry.

use super::ready::dispatchable_set;
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;

#[derive(Debug, Default)]
pub struct Reference {
    list: Vec<TaskId>,
    arcs: ArcSet,
}

impl Reference {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DispatchPolicy for Reference {
    fn initialize(&mut self, list: &[TaskId], arcs: &ArcSet) {
        self.list = list.to_vec();
        self.arcs = arcs.clone();
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
        dispatchable_set(job, &self.arcs, &self.list, state, strategy).into_iter().next()
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "reference"
    }
}
