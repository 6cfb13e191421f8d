//! Critical-path tail length: the longest weighted path (by mean task
//! duration) from a task to any sink in the static-DAG-plus-arcs graph.
//! Shared by `ABPolicy` (primary ranking) and `JFPol` (tie-break).

use crate::domain::{ArcSet, Job};
use crate::ids::TaskId;
use std::collections::HashMap;

pub fn successors_of(job: &Job, arcs: &ArcSet, task: TaskId) -> Vec<TaskId> {
    let mut succs: Vec<TaskId> = job
        .tasks()
        .filter(|(_, t)| t.predecessors().contains(&task))
        .map(|(&id, _)| id)
        .collect();
    for &(u, v) in arcs {
        if u == task {
            succs.push(v);
        }
    }
    succs
}

/// Tail length for every task in the job, memoized bottom-up. The graph is
/// acyclic by construction (ArcGA's incremental reachability repair never
/// admits a cycle), so plain recursion terminates.
pub fn critical_tails(job: &Job, arcs: &ArcSet) -> HashMap<TaskId, f64> {
    let mut memo = HashMap::new();
    for task in job.task_ids() {
        compute_tail(job, arcs, task, &mut memo);
    }
    memo
}

fn compute_tail(job: &Job, arcs: &ArcSet, task: TaskId, memo: &mut HashMap<TaskId, f64>) -> f64 {
    if let Some(&tail) = memo.get(&task) {
        return tail;
    }
    let duration = job.task(task).map(|t| t.mean_duration()).unwrap_or(0.0);
    let best_successor_tail = successors_of(job, arcs, task)
        .into_iter()
        .map(|s| compute_tail(job, arcs, s, memo))
        .fold(0.0_f64, f64::max);
    let tail = duration + best_successor_tail;
    memo.insert(task, tail);
    tail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Distribution, Task};
    use std::collections::HashSet;

    #[test]
    fn sink_tail_equals_own_duration() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(7.0)));
        job.initialize().unwrap();
        let tails = critical_tails(&job, &HashSet::new());
        assert_eq!(tails[&TaskId(1)], 7.0);
    }

    #[test]
    fn chain_tail_sums_along_the_path() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(3.0)));
        job.add_task(
            Task::new(TaskId(2), "T2", Distribution::Fixed(4.0)).with_predecessor(TaskId(1)),
        );
        job.initialize().unwrap();
        let tails = critical_tails(&job, &HashSet::new());
        assert_eq!(tails[&TaskId(2)], 4.0);
        assert_eq!(tails[&TaskId(1)], 7.0);
    }

    #[test]
    fn additional_arc_extends_the_tail() {
        let mut job = Job::new();
        job.add_task(Task::new(TaskId(1), "T1", Distribution::Fixed(3.0)));
        job.add_task(Task::new(TaskId(2), "T2", Distribution::Fixed(4.0)));
        job.initialize().unwrap();
        let mut arcs = HashSet::new();
        arcs.insert((TaskId(1), TaskId(2)));
        let tails = critical_tails(&job, &arcs);
        assert_eq!(tails[&TaskId(1)], 7.0);
    }
}
