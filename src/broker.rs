//! Resource broker: capability-to-resource matching and share-count
//! accounting.
//!
//! Binding a task's required-resource slots is all-or-nothing: the broker
//! computes a full reservation plan using a scratch copy of its counters
//! before touching live state, and only commits if every slot could be
//! satisfied.

use crate::domain::{Job, Task};
use crate::ids::Id;
use std::collections::HashMap;

/// Orders candidate resources within a `fulfilled_by` list before first-fit
/// selection. The default is a stable identity order (declaration order);
/// `LeastLoaded` re-sorts by current holder count ascending.
pub trait BrokerStrategy: Send + Sync {
    fn order_candidates(&self, candidates: &[Id], holders: &HashMap<Id, u32>) -> Vec<Id>;
}

/// Stable first-fit over `fulfilled_by` in the order present in the job.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFit;

impl BrokerStrategy for FirstFit {
    fn order_candidates(&self, candidates: &[Id], _holders: &HashMap<Id, u32>) -> Vec<Id> {
        candidates.to_vec()
    }
}

/// Re-sorts candidates by current load (holder count), ascending, before
/// first-fit. Ties preserve declaration order (stable sort).
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastLoaded;

impl BrokerStrategy for LeastLoaded {
    fn order_candidates(&self, candidates: &[Id], holders: &HashMap<Id, u32>) -> Vec<Id> {
        let mut ordered = candidates.to_vec();
        ordered.sort_by_key(|id| holders.get(id).copied().unwrap_or(0));
        ordered
    }
}

/// Per-resource holder counters, owned exclusively by one simulation run.
#[derive(Debug, Clone)]
pub struct ResourceBroker {
    holders: HashMap<Id, u32>,
}

impl ResourceBroker {
    pub fn new(job: &Job) -> Self {
        let holders = job.resources().iter().map(|r| (r.id().to_string(), 0)).collect();
        Self { holders }
    }

    pub fn holder_count(&self, resource_id: &str) -> u32 {
        self.holders.get(resource_id).copied().unwrap_or(0)
    }

    fn is_available(job: &Job, resource_id: &str, tentative: u32) -> bool {
        match job.resource(resource_id) {
            Some(r) => !r.is_capacitated() || tentative < r.max_share_count(),
            None => false,
        }
    }

    /// Attempts to bind every required-resource slot of `task`. Returns the
    /// flat list of bound resource ids (the task's `used_resources`) on
    /// success. On failure, no counters are mutated.
    pub fn try_bind(
        &mut self,
        job: &Job,
        task: &Task,
        strategy: &dyn BrokerStrategy,
    ) -> Option<Vec<Id>> {
        let mut tentative = self.holders.clone();
        let mut bound = Vec::new();

        for required in task.required_resources() {
            let ordered = strategy.order_candidates(required.fulfilled_by(), &tentative);
            let mut picked = Vec::new();
            for candidate in ordered {
                if picked.len() as u32 >= required.number_required() {
                    break;
                }
                let current = tentative.get(&candidate).copied().unwrap_or(0);
                if Self::is_available(job, &candidate, current) {
                    *tentative.entry(candidate.clone()).or_insert(0) += 1;
                    picked.push(candidate);
                }
            }
            if picked.len() < required.number_required() as usize {
                return None; // slot unsatisfiable under current state — abort, no mutation
            }
            bound.extend(picked);
        }

        self.holders = tentative;
        Some(bound)
    }

    /// Checks whether `task` could currently be bound, without mutating
    /// state. Used by policies' `has_next`.
    pub fn can_bind(&self, job: &Job, task: &Task, strategy: &dyn BrokerStrategy) -> bool {
        let mut probe = self.clone();
        probe.try_bind(job, task, strategy).is_some()
    }

    /// Releases a previously bound set of resources.
    pub fn release(&mut self, resources: &[Id]) {
        for resource_id in resources {
            if let Some(count) = self.holders.get_mut(resource_id) {
                *count = count.saturating_sub(1);
            }
        }
    }
}
