//! The reporter-facing output of one simulation run.

use crate::ids::{Id, TaskId};

/// One task's recorded execution, per spec.md §6's reporter contract.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskRecord {
    pub id: TaskId,
    pub name: String,
    pub started: f64,
    pub finished: f64,
    pub execution_time: f64,
    pub used_resources: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    pub total_time: f64,
    pub execution_history: Vec<TaskRecord>,
}
