//! Resource: a sharable facility identified uniquely, providing capabilities.

use crate::ids::{Id, TaskId};
use std::collections::HashSet;

/// A sharable facility.
///
/// `max_share_count` of 0 means non-capacitated (bookkeeping only, infinite
/// concurrent holders); 1 means exclusive; >1 means multi-share up to that
/// many concurrent holders.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    id: Id,
    name: String,
    max_share_count: u32,
    provided_capabilities: HashSet<Id>,
    /// Tasks that might need this resource. Derived at `Job::initialize`,
    /// never maintained as a live mutable back-edge (see SPEC_FULL.md §3).
    required_by: Vec<TaskId>,
}

impl Resource {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, max_share_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_share_count,
            provided_capabilities: HashSet::new(),
            required_by: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability_id: impl Into<Id>) -> Self {
        self.provided_capabilities.insert(capability_id.into());
        self
    }

    pub fn with_capabilities(mut self, capability_ids: impl IntoIterator<Item = Id>) -> Self {
        self.provided_capabilities.extend(capability_ids);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_share_count(&self) -> u32 {
        self.max_share_count
    }

    /// Whether the resource is capacitated (`max_share_count > 0`).
    pub fn is_capacitated(&self) -> bool {
        self.max_share_count > 0
    }

    pub fn provided_capabilities(&self) -> &HashSet<Id> {
        &self.provided_capabilities
    }

    pub fn provides(&self, capability_id: &str) -> bool {
        self.provided_capabilities.contains(capability_id)
    }

    pub fn required_by(&self) -> &[TaskId] {
        &self.required_by
    }

    pub(crate) fn set_required_by(&mut self, tasks: Vec<TaskId>) {
        self.required_by = tasks;
    }
}
