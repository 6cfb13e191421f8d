//! Task: a work item with a duration distribution and resource demands.

use super::distribution::Distribution;
use super::required_resource::RequiredResource;
use crate::ids::TaskId;
use rand::Rng;

/// A sample ring buffer supporting O(1) random draw with replacement.
///
/// Filled by the precompute mode; `Task::sample_duration` falls back to
/// live sampling from `distribution` when empty.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrecomputedSamples(Vec<f64>);

impl PrecomputedSamples {
    pub fn new(samples: Vec<f64>) -> Self {
        Self(samples)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn draw(&self, rng: &mut impl Rng) -> Option<f64> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0[rng.gen_range(0..self.0.len())])
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    id: TaskId,
    name: String,
    distribution: Distribution,
    required_resources: Vec<RequiredResource>,
    /// Static precedence predecessors (edges of the job's precedence DAG).
    predecessors: Vec<TaskId>,
    precomputed_execution_times: PrecomputedSamples,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            id,
            name: name.into(),
            distribution,
            required_resources: Vec::new(),
            predecessors: Vec::new(),
            precomputed_execution_times: PrecomputedSamples::default(),
        }
    }

    pub fn with_required_resource(mut self, required: RequiredResource) -> Self {
        self.required_resources.push(required);
        self
    }

    pub fn with_predecessor(mut self, predecessor: TaskId) -> Self {
        self.predecessors.push(predecessor);
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn required_resources(&self) -> &[RequiredResource] {
        &self.required_resources
    }

    pub fn required_resources_mut(&mut self) -> &mut [RequiredResource] {
        &mut self.required_resources
    }

    pub fn predecessors(&self) -> &[TaskId] {
        &self.predecessors
    }

    pub fn precomputed_execution_times(&self) -> &PrecomputedSamples {
        &self.precomputed_execution_times
    }

    pub fn fill_precomputed_execution_times(&mut self, count: usize, rng: &mut impl Rng) {
        let samples = (0..count).map(|_| self.distribution.sample(rng)).collect();
        self.precomputed_execution_times = PrecomputedSamples::new(samples);
    }

    /// Draws a duration sample: from the precomputed buffer if filled,
    /// otherwise live from `distribution`.
    pub fn sample_duration(&self, rng: &mut impl Rng) -> f64 {
        self.precomputed_execution_times
            .draw(rng)
            .unwrap_or_else(|| self.distribution.sample(rng))
    }

    /// Mean duration, used when `stochastic = false` (spec.md Config option).
    pub fn mean_duration(&self) -> f64 {
        self.distribution.mean()
    }
}
