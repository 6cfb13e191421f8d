//! Job: the root arena owning capabilities, resources, and tasks.

use super::capability::Capability;
use super::resource::Resource;
use super::task::Task;
use super::ArcSet;
use crate::error::SrcpspError;
use crate::ids::{Id, TaskId};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

/// Schedule artifacts produced by the optimizer: the priority list ListGA
/// searches over, and the additional-arcs set ArcGA searches over.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleArtifacts {
    pub priority_list: Vec<TaskId>,
    pub arcs: ArcSet,
}

/// The root domain object: unique-keyed arenas of capabilities, resources,
/// and tasks, plus optional schedule artifacts from the optimizer.
///
/// Resources and capabilities are kept in insertion order (a `Vec` plus an
/// id-to-index map) so that first-fit matching and candidate-arc enumeration
/// are deterministic given the same load order, matching the teacher
/// crate's `id_by_node`/`node_by_id` dual-map pattern.
#[derive(Debug, Clone)]
pub struct Job {
    capabilities: Vec<Capability>,
    capability_index: HashMap<Id, usize>,
    resources: Vec<Resource>,
    resource_index: HashMap<Id, usize>,
    tasks: BTreeMap<TaskId, Task>,
    already_initialized: bool,
    schedule_artifacts: Option<ScheduleArtifacts>,
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

impl Job {
    pub fn new() -> Self {
        Self {
            capabilities: Vec::new(),
            capability_index: HashMap::new(),
            resources: Vec::new(),
            resource_index: HashMap::new(),
            tasks: BTreeMap::new(),
            already_initialized: false,
            schedule_artifacts: None,
        }
    }

    // --- builder-style insertion ---------------------------------------

    pub fn add_capability(&mut self, capability: Capability) {
        let id = capability.id().to_string();
        let idx = self.capabilities.len();
        self.capabilities.push(capability);
        self.capability_index.insert(id, idx);
    }

    pub fn add_resource(&mut self, resource: Resource) {
        let id = resource.id().to_string();
        let idx = self.resources.len();
        self.resources.push(resource);
        self.resource_index.insert(id, idx);
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(task.id(), task);
    }

    // --- accessors -------------------------------------------------------

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn capability(&self, id: &str) -> Option<&Capability> {
        self.capability_index.get(id).map(|&i| &self.capabilities[i])
    }

    /// Resources in declaration order. Matching strategies iterate this
    /// order for deterministic stable first-fit.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resource_index.get(id).map(|&i| &self.resources[i])
    }

    pub fn resource_mut(&mut self, id: &str) -> Option<&mut Resource> {
        if let Some(&i) = self.resource_index.get(id) {
            Some(&mut self.resources[i])
        } else {
            None
        }
    }

    pub fn tasks(&self) -> impl Iterator<Item = (&TaskId, &Task)> {
        self.tasks.iter()
    }

    /// Mutable iteration over every task, in ascending id order. Used by
    /// precompute mode to fill each task's sample buffer in place.
    pub fn tasks_mut(&mut self) -> impl Iterator<Item = (&TaskId, &mut Task)> {
        self.tasks.iter_mut()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Task ids in ascending order. The default priority list before any GA
    /// run uses this order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn already_initialized(&self) -> bool {
        self.already_initialized
    }

    pub fn schedule_artifacts(&self) -> Option<&ScheduleArtifacts> {
        self.schedule_artifacts.as_ref()
    }

    pub fn set_schedule_artifacts(&mut self, artifacts: ScheduleArtifacts) {
        self.schedule_artifacts = Some(artifacts);
    }

    // --- initialization ---------------------------------------------------

    /// Populates `fulfilled_by` on every required-resource slot and
    /// `required_by` on every resource, then validates that every slot is
    /// satisfiable and that the static precedence graph is acyclic.
    ///
    /// Idempotent: calling twice recomputes the same derived data and is not
    /// an error (unlike the Python original's `already_initialized` guard,
    /// which only gated a one-time cache fill).
    pub fn initialize(&mut self) -> Result<(), SrcpspError> {
        self.compute_fulfilled_by();
        self.compute_required_by();
        self.validate_constraints()?;
        self.validate_acyclic()?;
        self.already_initialized = true;
        Ok(())
    }

    fn compute_fulfilled_by(&mut self) {
        let resources = self.resources.clone();
        for task in self.tasks.values_mut() {
            for required in task.required_resources_mut() {
                let fulfilled: Vec<Id> = resources
                    .iter()
                    .filter(|r| {
                        required
                            .required_capabilities()
                            .iter()
                            .all(|cap| r.provides(cap))
                    })
                    .map(|r| r.id().to_string())
                    .collect();
                required.set_fulfilled_by(fulfilled);
            }
        }
    }

    fn compute_required_by(&mut self) {
        let mut required_by: HashMap<Id, Vec<TaskId>> = HashMap::new();
        for (task_id, task) in self.tasks.iter() {
            for required in task.required_resources() {
                for resource_id in required.fulfilled_by() {
                    required_by.entry(resource_id.clone()).or_default().push(*task_id);
                }
            }
        }
        for resource in &mut self.resources {
            let tasks = required_by.remove(resource.id()).unwrap_or_default();
            resource.set_required_by(tasks);
        }
    }

    fn validate_constraints(&self) -> Result<(), SrcpspError> {
        for (task_id, task) in self.tasks.iter() {
            for required in task.required_resources() {
                if !required.is_satisfiable() {
                    return Err(SrcpspError::ConstraintError {
                        task: *task_id,
                        detail: format!(
                            "requires {} distinct resources providing {:?}, only {} available",
                            required.number_required(),
                            required.required_capabilities(),
                            required.fulfilled_by().len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_acyclic(&self) -> Result<(), SrcpspError> {
        let (graph, _) = self.build_precedence_graph();
        toposort(&graph, None).map_err(|cycle| SrcpspError::ConstraintError {
            task: graph[cycle.node_id()],
            detail: "precedence graph contains a cycle".to_string(),
        })?;
        Ok(())
    }

    /// Builds a `petgraph` DAG of the static precedence structure: one node
    /// per task, one edge per `predecessor -> task` pair. Reused by
    /// `initialize`'s acyclicity check and by ArcGA's candidate-arc
    /// enumeration and incremental reachability repair.
    pub fn build_precedence_graph(&self) -> (DiGraph<TaskId, ()>, HashMap<TaskId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for &task_id in self.tasks.keys() {
            index.insert(task_id, graph.add_node(task_id));
        }
        for (&task_id, task) in self.tasks.iter() {
            for &predecessor in task.predecessors() {
                if let (Some(&from), Some(&to)) = (index.get(&predecessor), index.get(&task_id)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        (graph, index)
    }
}
