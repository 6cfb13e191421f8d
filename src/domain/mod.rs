//! Domain model: capabilities, resources, tasks, and the owning `Job` arena.
//!
//! Capabilities/Resources/Tasks are immutable after loading except for
//! runtime scratch fields, which live outside this module entirely (see
//! [`crate::simulator::state`]) so the static graph can be shared by
//! reference across parallel GA workers.

pub mod capability;
pub mod distribution;
pub mod job;
pub mod required_resource;
pub mod resource;
pub mod task;

pub use capability::Capability;
pub use distribution::Distribution;
pub use job::Job;
pub use required_resource::RequiredResource;
pub use resource::Resource;
pub use task::Task;

use crate::ids::TaskId;
use std::collections::HashSet;

/// A set of additional precedence arcs produced by ArcGA, layered on top of
/// the static DAG. `(u, v)` means "u must finish before v starts."
pub type ArcSet = HashSet<(TaskId, TaskId)>;
