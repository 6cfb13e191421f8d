//! Dispatch policies: six deterministic (mostly) rules for picking the next
//! task to start from the ready+dispatchable set.
//!
//! Grounded on the teacher crate's `algorithms::rl::policy` trait-per-concern
//! layout (`trait_.rs` + one file per policy + `mod.rs` registry) and on
//! `algorithms::est::ordering`'s "compute a deterministic sort key, pop the
//! front" shape.
//!
//! One deliberate departure from spec.md §4.C's literal method signatures:
//! `Job`/`ArcSet` are threaded through every call instead of captured by
//! `initialize` and held by reference. Storing `&'a Job` on a trait object
//! the `Simulator` keeps across the whole run would force a lifetime
//! parameter onto `DispatchPolicy` and everything that holds one (including
//! the GA's worker pool); passing it per call sidesteps that entirely while
//! preserving the exact same decision logic. `initialize`/`reset` still
//! exist, for the state each policy keeps *between* calls (priority-list
//! position index, RBRS's RNG).

mod ab;
mod critical_path;
mod jf;
mod optimized_dependency;
mod pp;
mod rbrs;
mod reference;
pub mod ready;

use crate::broker::BrokerStrategy;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ids::TaskId;
use crate::simulator::state::SimState;

pub use ab::ABPolicy;
pub use jf::JFPol;
pub use optimized_dependency::OptimizedDependency;
pub use pp::PPPolicies;
pub use rbrs::RBRS;
pub use reference::Reference;

/// A dispatch rule over the ready+dispatchable set at a simulation decision
/// point.
pub trait DispatchPolicy: Send + Sync {
    /// Captures the priority list and additional arcs for this run. Called
    /// once before the first `has_next`/`get_next`.
    fn initialize(&mut self, list: &[TaskId], arcs: &ArcSet);

    /// Clears any per-run state (besides the captured list/arcs), for reuse
    /// across Monte Carlo replications without reallocating the policy.
    fn reset(&mut self);

    fn has_next(&self, job: &Job, state: &SimState, strategy: &dyn BrokerStrategy) -> bool;

    fn get_next(
        &mut self,
        job: &Job,
        state: &mut SimState,
        strategy: &dyn BrokerStrategy,
    ) -> Option<TaskId>;

    fn on_finished(&mut self, task: TaskId, state: &mut SimState);

    fn name(&self) -> &'static str;
}

/// Builds a named policy. `seed` feeds `RBRS`'s per-replication RNG; other
/// policies ignore it.
pub fn build(name: &str, seed: u64) -> Result<Box<dyn DispatchPolicy>, SrcpspError> {
    match name {
        "reference" => Ok(Box::new(Reference::new())),
        "optimized_dependency" => Ok(Box::new(OptimizedDependency::new())),
        "rbrs" => Ok(Box::new(RBRS::new(seed))),
        "pp" => Ok(Box::new(PPPolicies::new())),
        "ab" => Ok(Box::new(ABPolicy::new())),
        "jf" => Ok(Box::new(JFPol::new())),
        other => Err(SrcpspError::ConfigError(format!("unknown dispatch policy {other:?}"))),
    }
}
