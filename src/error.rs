use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced at the container runtime adapter boundary.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced at the task driver boundary.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("task [{name}] is in an inconsistent state: {count} matching containers")]
    Inconsistency { name: String, count: usize },

    #[error("task [{name}] did not report as running after start")]
    StartVerificationFailed { name: String },

    #[error("next_tasks called while task [{name}] is still running")]
    StillRunning { name: String },
}

/// Errors surfaced at the controller facade boundary — the seam a module
/// dispatch fabric would see.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("invalid task directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("malformed task definition at {path}: {reason}")]
    MalformedSpec { path: PathBuf, reason: String },

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid action payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
