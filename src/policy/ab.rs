//! ABPolicy: activity-based. Prefers the dispatchable task with the longest
//! remaining critical-path tail, ties by priority-list order.

use super::critical_path::critical_tails;
use super::ready::dispatchable_set;
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ABPolicy {
    list: Vec<TaskId>,
    arcs: ArcSet,
    position: HashMap<TaskId, usize>,
}

impl ABPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DispatchPolicy for ABPolicy {
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
        let tails = critical_tails(job, &self.arcs);
        candidates
            .into_iter()
            .max_by(|&a, &b| {
                let ta = tails.get(&a).copied().unwrap_or(0.0);
                let tb = tails.get(&b).copied().unwrap_or(0.0);
                ta.total_cmp(&tb).then_with(|| {
                    let pa = self.position.get(&a).copied().unwrap_or(usize::MAX);
                    let pb = self.position.get(&b).copied().unwrap_or(usize::MAX);
                    pb.cmp(&pa) // smaller position wins -> reverse for max_by
                })
            })
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "ab"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FirstFit;
    use crate::domain::{Distribution, Task};

    #[test]
    fn prefers_task_on_the_longer_tail() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(3), "T3", Distribution::Fixed(10.0)).with_predecessor(TaskId(2)),
        );
        job.initialize().unwrap();

        let mut policy = ABPolicy::new();
        policy.initialize(&[TaskId(1), TaskId(2)], &ArcSet::default());
        let mut state = SimState::new(&job);
        // T2's tail (1 + 10 = 11) exceeds T1's tail (1).
        assert_eq!(policy.get_next(&job, &mut state, &FirstFit), Some(TaskId(2)));
    }
}
