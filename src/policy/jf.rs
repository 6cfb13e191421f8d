//! JFPol: justified-first. Same one-step look-ahead as `PPPolicies`, but
//! breaks ties between equally good candidates by preferring whichever has
//! the smaller `(project_critical_path - critical_tail)` slack — i.e. the
//! task closer to the project's critical path, using the same tail measure
//! `ABPolicy` ranks by directly.

use super::critical_path::critical_tails;
use super::ready::{dispatchable_set, ready_set};
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct JFPol {
    list: Vec<TaskId>,
    arcs: ArcSet,
    position: HashMap<TaskId, usize>,
}

impl JFPol {
    pub fn new() -> Self {
        Self::default()
    }

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
            return usize::MAX;
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

impl DispatchPolicy for JFPol {
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
        let tails = critical_tails(job, &self.arcs);
        let project_tail = tails.values().copied().fold(0.0_f64, f64::max);

        candidates
            .into_iter()
            .map(|t| {
                let lockout = self.lockout_count(job, state, strategy, t, &remaining_ready);
                let slack = project_tail - tails.get(&t).copied().unwrap_or(0.0);
                let pos = self.position.get(&t).copied().unwrap_or(usize::MAX);
                // total_cmp-friendly ordering key: lockout asc, slack asc, position asc
                (t, lockout, (slack * 1e9).round() as i64, pos)
            })
            .min_by_key(|&(_, lockout, slack_key, pos)| (lockout, slack_key, pos))
            .map(|(t, ..)| t)
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "jf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FirstFit;
    use crate::domain::{Distribution, Task};

    #[test]
    fn tie_breaks_toward_the_more_urgent_task() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)));
        job.add_task(
            Task::new(TaskId(3), "T3", Distribution::Fixed(10.0)).with_predecessor(TaskId(2)),
        );
        job.initialize().unwrap();

        let mut policy = JFPol::new();
        policy.initialize(&[TaskId(1), TaskId(2)], &ArcSet::default());
        let mut state = SimState::new(&job);
        // No resources required, so lockout is 0 for both -> tie broken by slack.
        assert_eq!(policy.get_next(&job, &mut state, &FirstFit), Some(TaskId(2)));
    }
}
