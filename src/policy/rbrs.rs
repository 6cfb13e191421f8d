//! RBRS: resource-based random sampling. Weights each dispatchable task by
//! the available slack across its required-resource slots and draws one by
//! weighted random sampling from a seeded RNG.
//!
//! This is the one policy whose choice is nondeterministic given (job, list,
//! arcs) alone — its nondeterminism is confined to the RNG draw, itself
//! seeded deterministically from (generation, individual, replication) by
//! the Monte Carlo harness (spec.md §4.G / §5).

use super::ready::dispatchable_set;
use super::DispatchPolicy;
use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use crate::simulator::state::SimState;
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
pub struct RBRS {
    list: Vec<TaskId>,
    arcs: ArcSet,
    seed: u64,
    rng: StdRng,
}

impl RBRS {
    pub fn new(seed: u64) -> Self {
        Self { list: Vec::new(), arcs: ArcSet::default(), seed, rng: StdRng::seed_from_u64(seed) }
    }

    /// Minimum slack across `task`'s required-resource slots: for each slot,
    /// the smallest (max_share_count - current holders) among its candidate
    /// resources, summed over slots, floored at 1 to keep weights positive.
    fn weight(&self, job: &Job, state: &SimState, task: &crate::domain::Task) -> f64 {
        let mut total: i64 = 0;
        for required in task.required_resources() {
            let min_slack = required
                .fulfilled_by()
                .iter()
                .filter_map(|rid| job.resource(rid))
                .map(|r| {
                    if r.is_capacitated() {
                        (r.max_share_count() as i64 - state.broker().holder_count(r.id()) as i64)
                            .max(0)
                    } else {
                        i64::MAX / 2
                    }
                })
                .min()
                .unwrap_or(0);
            total += min_slack;
        }
        total.max(1) as f64
    }
}

impl DispatchPolicy for RBRS {
    fn initialize(&mut self, list: &[TaskId], arcs: &ArcSet) {
        self.list = list.to_vec();
        self.arcs = arcs.clone();
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

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
        if candidates.is_empty() {
            return None;
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&t| self.weight(job, state, job.task(t).expect("dispatchable task must exist")))
            .collect();
        let dist = WeightedIndex::new(&weights).expect("weights are always positive");
        Some(candidates[dist.sample(&mut self.rng)])
    }

    fn on_finished(&mut self, _task: TaskId, _state: &mut SimState) {}

    fn name(&self) -> &'static str {
        "rbrs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::FirstFit;
    use crate::domain::{Distribution, Task};

    #[test]
    fn reset_reproduces_the_same_draw_sequence() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(1.0)));
        job.add_task(Task::new(TaskId(2), "T2", Distribution::Fixed(1.0)));
        job.initialize().unwrap();

        let mut policy = RBRS::new(42);
        policy.initialize(&[TaskId(1), TaskId(2)], &ArcSet::default());
        let mut state_a = SimState::new(&job);
        let first = policy.get_next(&job, &mut state_a, &FirstFit);

        policy.reset();
        let mut state_b = SimState::new(&job);
        let second = policy.get_next(&job, &mut state_b, &FirstFit);
        assert_eq!(first, second);
    }

    #[test]
    fn no_candidates_returns_none() {
        let job = Job::new();
        let mut policy = RBRS::new(0);
        policy.initialize(&[], &ArcSet::default());
        let mut state = SimState::new(&job);
        assert_eq!(policy.get_next(&job, &mut state, &FirstFit), None);
    }
}
