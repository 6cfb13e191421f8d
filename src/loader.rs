//! Loader seam: the object-graph deserialization of an input job is an
//! external collaborator (spec.md §1's Non-goals), but the crate still
//! exposes the seam a caller plugs a format into, plus one reference
//! implementation behind feature `serde` so `simulate`/`optimize`/
//! `precompute` are callable end-to-end without hand-building a `Job`.

use crate::domain::Job;
use crate::error::SrcpspError;

/// Loads a `Job` from an opaque source string (a file path, a URL, an
/// inline payload — the trait does not prescribe which). Implementations
/// must call [`Job::initialize`] before returning, per spec.md §6's loader
/// contract ("the loader is also responsible for marking
/// `already_initialized` true").
pub trait JobLoader {
    fn load(&self, source: &str) -> Result<Job, SrcpspError>;
}

#[cfg(feature = "serde")]
pub use json::{JobSpec, JsonJobLoader};

#[cfg(feature = "serde")]
mod json {
    use super::JobLoader;
    use crate::domain::{Capability, Distribution, Job, RequiredResource, Resource, Task};
    use crate::error::SrcpspError;
    use crate::ids::TaskId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CapabilitySpec {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ResourceSpec {
        pub id: String,
        pub name: String,
        pub max_share_count: u32,
        #[serde(default)]
        pub provided_capabilities: Vec<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RequiredResourceSpec {
        pub required_capabilities: Vec<String>,
        pub number_required: u32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TaskSpec {
        pub id: u32,
        pub name: String,
        pub distribution: Distribution,
        #[serde(default)]
        pub required_resources: Vec<RequiredResourceSpec>,
        #[serde(default)]
        pub predecessors: Vec<u32>,
    }

    /// The crate's own minimal load format — plain vectors of
    /// capabilities/resources/tasks with inline precedence and demand data.
    /// Not a port of `original_source`'s pickled object graph (that format
    /// stays explicitly out of scope); this is the documented seam a real
    /// loader plugs a richer format into.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct JobSpec {
        #[serde(default)]
        pub capabilities: Vec<CapabilitySpec>,
        #[serde(default)]
        pub resources: Vec<ResourceSpec>,
        #[serde(default)]
        pub tasks: Vec<TaskSpec>,
    }

    impl JobSpec {
        pub fn into_job(self) -> Result<Job, SrcpspError> {
            let mut job = Job::new();
            for cap in self.capabilities {
                job.add_capability(Capability::new(cap.id, cap.name));
            }
            for res in self.resources {
                job.add_resource(
                    Resource::new(res.id, res.name, res.max_share_count)
                        .with_capabilities(res.provided_capabilities),
                );
            }
            for spec in self.tasks {
                let mut task = Task::new(TaskId(spec.id), spec.name, spec.distribution);
                for predecessor in spec.predecessors {
                    task = task.with_predecessor(TaskId(predecessor));
                }
                for required in spec.required_resources {
                    task = task.with_required_resource(RequiredResource::new(
                        required.required_capabilities,
                        required.number_required,
                    ));
                }
                job.add_task(task);
            }
            job.initialize()?;
            Ok(job)
        }
    }

    /// Reference `JobLoader`: parses `source` as a `JobSpec` JSON document.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct JsonJobLoader;

    impl JobLoader for JsonJobLoader {
        fn load(&self, source: &str) -> Result<Job, SrcpspError> {
            let spec: JobSpec =
                serde_json::from_str(source).map_err(|e| SrcpspError::LoadError(e.to_string()))?;
            spec.into_job()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn loads_a_simple_chain_job() {
            let source = r#"{
                "capabilities": [{"id": "C", "name": "generic"}],
                "resources": [{"id": "R1", "name": "r1", "max_share_count": 1, "provided_capabilities": ["C"]}],
                "tasks": [
                    {"id": 1, "name": "T1", "distribution": {"Fixed": 10.0}, "required_resources": [{"required_capabilities": ["C"], "number_required": 1}]},
                    {"id": 2, "name": "T2", "distribution": {"Fixed": 20.0}, "predecessors": [1]}
                ]
            }"#;
            let job = JsonJobLoader.load(source).unwrap();
            assert!(job.already_initialized());
            assert_eq!(job.task_count(), 2);
            assert_eq!(job.task(TaskId(2)).unwrap().predecessors(), &[TaskId(1)]);
        }

        #[test]
        fn malformed_json_is_a_load_error() {
            let err = JsonJobLoader.load("not json").unwrap_err();
            assert!(matches!(err, SrcpspError::LoadError(_)));
        }

        #[test]
        fn unsatisfiable_slot_surfaces_as_constraint_error_through_initialize() {
            let source = r#"{
                "capabilities": [{"id": "C", "name": "generic"}],
                "tasks": [
                    {"id": 1, "name": "T1", "distribution": {"Fixed": 1.0}, "required_resources": [{"required_capabilities": ["C"], "number_required": 1}]}
                ]
            }"#;
            let err = JsonJobLoader.load(source).unwrap_err();
            assert!(matches!(err, SrcpspError::ConstraintError { .. }));
        }
    }
}
