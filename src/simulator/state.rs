//! Runtime scratch state for one simulation run, kept separate from the
//! immutable `Job` arena so a single job can be shared by reference across
//! parallel GA workers.

use crate::broker::ResourceBroker;
use crate::domain::Job;
use crate::ids::{Id, TaskId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TaskRuntimeState {
    pub started: bool,
    pub finished: bool,
    pub start_time: Option<f64>,
    pub finish_time: Option<f64>,
    pub used_resources: Vec<Id>,
}

/// Everything that changes over the course of one simulation run: the clock,
/// per-task started/finished scratch, and the resource broker's holder
/// counters. Fresh for every run — never reused across replications.
#[derive(Debug, Clone)]
pub struct SimState {
    current_time: f64,
    runtime: BTreeMap<TaskId, TaskRuntimeState>,
    broker: ResourceBroker,
}

impl SimState {
    pub fn new(job: &Job) -> Self {
        let runtime = job
            .task_ids()
            .into_iter()
            .map(|id| (id, TaskRuntimeState::default()))
            .collect();
        Self {
            current_time: 0.0,
            runtime,
            broker: ResourceBroker::new(job),
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn advance_to(&mut self, time: f64) {
        debug_assert!(time >= self.current_time, "simulation clock must not move backwards");
        self.current_time = time;
    }

    pub fn is_started(&self, task: TaskId) -> bool {
        self.runtime.get(&task).map(|s| s.started).unwrap_or(false)
    }

    pub fn is_finished(&self, task: TaskId) -> bool {
        self.runtime.get(&task).map(|s| s.finished).unwrap_or(false)
    }

    pub fn mark_started(&mut self, task: TaskId, used_resources: Vec<Id>) {
        let entry = self.runtime.entry(task).or_default();
        entry.started = true;
        entry.start_time = Some(self.current_time);
        entry.used_resources = used_resources;
    }

    /// Marks `task` finished and returns the resources it held, for the
    /// caller to release through the broker. The record is retained on
    /// `TaskRuntimeState` (not taken) so the reporter can still read it via
    /// [`SimState::used_resources`] after the broker has released it.
    pub fn mark_finished(&mut self, task: TaskId) -> Vec<Id> {
        let entry = self.runtime.entry(task).or_default();
        entry.finished = true;
        entry.finish_time = Some(self.current_time);
        entry.used_resources.clone()
    }

    pub fn used_resources(&self, task: TaskId) -> &[Id] {
        self.runtime.get(&task).map(|s| s.used_resources.as_slice()).unwrap_or(&[])
    }

    pub fn start_time(&self, task: TaskId) -> Option<f64> {
        self.runtime.get(&task).and_then(|s| s.start_time)
    }

    pub fn finish_time(&self, task: TaskId) -> Option<f64> {
        self.runtime.get(&task).and_then(|s| s.finish_time)
    }

    pub fn finished_count(&self) -> usize {
        self.runtime.values().filter(|s| s.finished).count()
    }

    pub fn unstarted_tasks(&self) -> Vec<TaskId> {
        self.runtime
            .iter()
            .filter(|(_, s)| !s.started)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn broker(&self) -> &ResourceBroker {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut ResourceBroker {
        &mut self.broker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Distribution, Task};

    fn one_task_job() -> Job {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(5.0)));
        job.initialize().unwrap();
        job
    }

    #[test]
    fn fresh_state_has_no_started_or_finished_tasks() {
        let job = one_task_job();
        let state = SimState::new(&job);
        assert!(!state.is_started(TaskId(1)));
        assert!(!state.is_finished(TaskId(1)));
        assert_eq!(state.finished_count(), 0);
        assert_eq!(state.unstarted_tasks(), vec![TaskId(1)]);
    }

    #[test]
    fn start_then_finish_round_trip() {
        let job = one_task_job();
        let mut state = SimState::new(&job);
        state.mark_started(TaskId(1), vec!["R1".to_string()]);
        assert!(state.is_started(TaskId(1)));
        assert_eq!(state.start_time(TaskId(1)), Some(0.0));

        state.advance_to(5.0);
        let released = state.mark_finished(TaskId(1));
        assert_eq!(released, vec!["R1".to_string()]);
        assert!(state.is_finished(TaskId(1)));
        assert_eq!(state.finish_time(TaskId(1)), Some(5.0));
        assert_eq!(state.finished_count(), 1);
    }
}
