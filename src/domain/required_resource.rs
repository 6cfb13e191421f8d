//! RequiredResource: a demand slot on a task.

use crate::ids::Id;
use std::collections::HashSet;

/// A demand slot on a task: a set of required capabilities and a count of
/// distinct resource instances to bind.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequiredResource {
    required_capabilities: HashSet<Id>,
    number_required: u32,
    /// Resources that statically satisfy `required_capabilities`. Derived at
    /// `Job::initialize`.
    fulfilled_by: Vec<Id>,
}

impl RequiredResource {
    pub fn new(required_capabilities: impl IntoIterator<Item = Id>, number_required: u32) -> Self {
        assert!(number_required >= 1, "number_required must be >= 1");
        Self {
            required_capabilities: required_capabilities.into_iter().collect(),
            number_required,
            fulfilled_by: Vec::new(),
        }
    }

    pub fn required_capabilities(&self) -> &HashSet<Id> {
        &self.required_capabilities
    }

    pub fn number_required(&self) -> u32 {
        self.number_required
    }

    pub fn fulfilled_by(&self) -> &[Id] {
        &self.fulfilled_by
    }

    pub(crate) fn set_fulfilled_by(&mut self, resources: Vec<Id>) {
        self.fulfilled_by = resources;
    }

    /// Whether this slot is staticaly satisfiable: enough distinct resources
    /// exist that together cover `required_capabilities`.
    pub fn is_satisfiable(&self) -> bool {
        self.fulfilled_by.len() >= self.number_required as usize
    }
}
