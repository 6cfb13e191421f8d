//! Crate-wide error type.
//!
//! One variant per error kind named in the scheduling design: `LoadError`
//! and `ConfigError` are fatal at startup, `ConstraintError` is fatal at job
//! initialization, `DeadlockError` is a local failure inside a single
//! simulation run, and `InvalidIndividual` documents a GA repair failure
//! (carried as a count in generation logs rather than propagated as `Err`).

use crate::ids::TaskId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SrcpspError {
    #[error("failed to load job: {0}")]
    LoadError(String),

    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("task {task} cannot be satisfied: {detail}")]
    ConstraintError { task: TaskId, detail: String },

    #[error("simulation deadlocked with {remaining} task(s) unstarted: {tasks:?}")]
    DeadlockError {
        remaining: usize,
        tasks: Vec<TaskId>,
    },

    #[error("GA repair could not produce a valid individual: {0}")]
    InvalidIndividual(String),
}

pub type Result<T> = std::result::Result<T, SrcpspError>;
