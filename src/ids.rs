//! Identifier types used across the domain model.

use std::fmt;

/// Identifier type used for capabilities and resources.
///
/// Matches the teacher crate's convention of a plain string handle rather
/// than a typed newtype, since capability/resource identity is externally
/// supplied (loader-provided names) rather than crate-assigned.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Task identifier.
///
/// Tasks are identified by an integer id (spec: "a work item identified by
/// an integer id"), unlike capabilities/resources which use string handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(value: u32) -> Self {
        TaskId(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(TaskId)
    }
}
