//! The declarative task definition (spec §3, `TaskSpec`).

use std::collections::HashMap;

use serde::Deserialize;

/// One task definition loaded from a `*.json` file in the task directory.
///
/// Immutable after load — nothing in the controller ever mutates a `TaskSpec` once
/// `TaskStore::load` has returned.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    /// Unique key within the store; also the container name.
    pub name: String,

    /// Container image reference to pull and run.
    pub image: String,

    /// Container argv; empty means "use the image's default entrypoint".
    #[serde(default)]
    pub command: Vec<String>,

    /// Environment variables, serialized as `"NAME=VALUE"` at create time.
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Host port (string key) -> container port.
    #[serde(default)]
    pub ports: HashMap<String, u16>,

    /// Host path -> container path bind mounts.
    #[serde(default)]
    pub volumes: HashMap<String, String>,

    /// Informational only — the driver and supervisor do not branch on it (spec §9).
    #[serde(default)]
    pub daemon: bool,

    /// Task names to start when this task exits with code 0.
    #[serde(default)]
    pub on_success: Vec<String>,

    /// Task names to start when this task exits with a non-zero code.
    #[serde(default)]
    pub on_failure: Vec<String>,
}
