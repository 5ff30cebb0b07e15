//! The container runtime adapter contract (spec §4.2).
//!
//! The task driver never talks to a container engine directly — it is built against
//! this trait, and the controller is generic over it. The driver re-resolves a
//! container's id via `list_by_name` on every operation rather than caching one, so an
//! implementation carries no client-side state across calls.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AdapterError;

/// Everything the driver needs to hand off to `create` for one task.
///
/// Built from a `TaskSpec` by the driver (`task::driver::build_create_spec`); an
/// adapter implementation never sees a `TaskSpec` directly.
#[derive(Debug, Clone)]
pub struct ContainerCreateSpec {
    /// Container name — also the lookup key for `list_by_name`.
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    /// `"NAME=VALUE"` entries, order-independent.
    pub env: Vec<String>,
    /// Exposed container ports, formatted `"<port>/tcp"`.
    pub exposed_ports: Vec<String>,
    /// Container port (formatted `"<port>/tcp"`) → host port, bound to `0.0.0.0`.
    pub port_bindings: HashMap<String, String>,
    /// `"HOST:CONTAINER"` bind mounts.
    pub binds: Vec<String>,
}

/// Result of `inspect` — the only state the driver reads off a container besides
/// whether it's there at all.
#[derive(Debug, Clone, Copy)]
pub struct ContainerInspection {
    pub running: bool,
    pub exit_code: i64,
}

/// Identifies one container returned by `list_by_name`.
#[derive(Debug, Clone)]
pub struct ContainerRef {
    pub id: String,
}

/// Capability bundle the task driver is built against (spec §4.2).
///
/// All operations are blocking with respect to the caller; an implementation is free
/// to be internally asynchronous. Every method fails with [`AdapterError`] distinct
/// from "not found" — an empty `list_by_name` result is the encoding for absence, not
/// an error.
#[async_trait]
pub trait ContainerRuntimeAdapter: Send + Sync {
    /// Pull `image`. Idempotent; safe to call even if the image is already present.
    async fn pull(&self, image: &str) -> Result<(), AdapterError>;

    /// Create a container from `spec`, returning its id.
    async fn create(&self, spec: &ContainerCreateSpec) -> Result<String, AdapterError>;

    /// Start a previously created container.
    async fn start(&self, id: &str) -> Result<(), AdapterError>;

    /// Stop a running container, giving it `grace` before the runtime escalates.
    async fn stop(&self, id: &str, grace: std::time::Duration) -> Result<(), AdapterError>;

    /// Remove a container. `force` removes it even if still running.
    async fn remove(&self, id: &str, force: bool) -> Result<(), AdapterError>;

    /// Inspect running state and exit code.
    async fn inspect(&self, id: &str) -> Result<ContainerInspection, AdapterError>;

    /// List containers (including stopped ones) with the given name.
    ///
    /// Cardinality 0 means absent, 1 means the expected single container, and
    /// anything greater is a driver-level [`crate::error::DriverError::Inconsistency`].
    async fn list_by_name(&self, name: &str) -> Result<Vec<ContainerRef>, AdapterError>;
}
