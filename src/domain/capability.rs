//! Capability: an opaque token a resource can provide and a task may require.

use crate::ids::Id;

/// A capability a resource can provide and a task may require.
///
/// A many-to-many matching attribute — any number of resources may provide
/// the same capability, and a task's required-resource slot may require
/// more than one capability simultaneously.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capability {
    id: Id,
    name: String,
}

impl Capability {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
