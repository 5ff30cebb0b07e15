//! The task driver: translates a [`TaskSpec`] into runtime-adapter operations and
//! observes its state (spec §4.3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::runtime::{ContainerCreateSpec, ContainerRuntimeAdapter};

use super::spec::TaskSpec;

/// Builds a [`ContainerCreateSpec`] from a [`TaskSpec`], enforcing the wire-contract
/// formats named in spec §6: container ports as `"<port>/tcp"`, env as `"K=V"`,
/// binds as `"HOST:CONTAINER"`.
pub fn build_create_spec(spec: &TaskSpec) -> ContainerCreateSpec {
    let exposed_ports: Vec<String> = spec
        .ports
        .values()
        .map(|container_port| format!("{}/tcp", container_port))
        .collect();

    let port_bindings: HashMap<String, String> = spec
        .ports
        .iter()
        .map(|(host_port, container_port)| (format!("{}/tcp", container_port), host_port.clone()))
        .collect();

    let env: Vec<String> = spec
        .environment
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    let binds: Vec<String> = spec
        .volumes
        .iter()
        .map(|(host, container)| format!("{}:{}", host, container))
        .collect();

    ContainerCreateSpec {
        name: spec.name.clone(),
        image: spec.image.clone(),
        command: spec.command.clone(),
        env,
        exposed_ports,
        port_bindings,
        binds,
    }
}

/// Drives one [`TaskSpec`] through the adapter `A`. Stateless beyond the spec it was
/// built from — the driver re-resolves the container id via `list_by_name` on every
/// call rather than caching one (spec §4.2).
pub struct TaskDriver<A: ContainerRuntimeAdapter> {
    spec: TaskSpec,
    adapter: Arc<A>,
    /// Grace period given to a container between `stop` and a forced `remove`
    /// (spec §4.3; ambient default 10s, configurable via [`crate::Configuration`]).
    stop_grace: Duration,
}

impl<A: ContainerRuntimeAdapter> TaskDriver<A> {
    pub fn new(spec: TaskSpec, adapter: Arc<A>, stop_grace: Duration) -> Self {
        Self { spec, adapter, stop_grace }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Pulls the task's image. Idempotent; network failures propagate.
    pub async fn initialize(&self) -> Result<(), DriverError> {
        debug!("ensuring image [{}] is available...", self.spec.image);
        self.adapter.pull(&self.spec.image).await?;
        debug!("image [{}] is available", self.spec.image);
        Ok(())
    }

    /// Resolves the single container by name, if any. `Ok(None)` means absent;
    /// `Err(Inconsistency)` means more than one matched.
    async fn resolve(&self) -> Result<Option<String>, DriverError> {
        let refs = self.adapter.list_by_name(&self.spec.name).await?;
        match refs.len() {
            0 => Ok(None),
            1 => Ok(Some(refs.into_iter().next().unwrap().id)),
            count => Err(DriverError::Inconsistency {
                name: self.spec.name.clone(),
                count,
            }),
        }
    }

    /// True iff exactly one container by this name exists and is reporting as
    /// running.
    pub async fn is_running(&self) -> Result<bool, DriverError> {
        match self.resolve().await? {
            None => Ok(false),
            Some(id) => Ok(self.adapter.inspect(&id).await?.running),
        }
    }

    /// Creates and starts the container, then verifies it came up.
    pub async fn start(&self) -> Result<(), DriverError> {
        info!("starting task: {}", self.spec.name);

        let create_spec = build_create_spec(&self.spec);
        let id = self.adapter.create(&create_spec).await?;
        self.adapter.start(&id).await?;

        if !self.adapter.inspect(&id).await?.running {
            return Err(DriverError::StartVerificationFailed {
                name: self.spec.name.clone(),
            });
        }

        info!("task [{}] started", self.spec.name);
        Ok(())
    }

    /// Stops the running container, giving it the configured grace period.
    pub async fn stop(&self) -> Result<(), DriverError> {
        info!("stopping task: {}", self.spec.name);

        let id = self.resolve().await?.ok_or_else(|| DriverError::Inconsistency {
            name: self.spec.name.clone(),
            count: 0,
        })?;

        self.adapter.stop(&id, self.stop_grace).await?;
        Ok(())
    }

    /// Removes the container. Tolerates absence (already reaped) as a silent
    /// success — cleanup must be safe to re-enter.
    pub async fn cleanup(&self) -> Result<(), DriverError> {
        let id = match self.resolve_tolerant().await? {
            Some(id) => id,
            None => return Ok(()),
        };

        info!("cleaning up container: {}", self.spec.name);
        self.adapter.remove(&id, true).await?;
        Ok(())
    }

    /// Like `resolve`, but any cardinality other than exactly 1 is treated as
    /// "nothing to clean up" rather than an error. A genuine adapter-transport
    /// failure still propagates — only the cardinality mismatch is tolerated.
    async fn resolve_tolerant(&self) -> Result<Option<String>, DriverError> {
        let refs = self.adapter.list_by_name(&self.spec.name).await?;
        Ok(match refs.len() {
            1 => Some(refs.into_iter().next().unwrap().id),
            _ => None,
        })
    }

    /// Fetches the exit status and returns `on_success`/`on_failure` accordingly.
    /// Returns an empty sequence if the container was already reaped out from under
    /// us rather than risk chaining on unknown state.
    pub async fn next_tasks(&self) -> Result<Vec<String>, DriverError> {
        let id = match self.resolve().await? {
            Some(id) => id,
            None => {
                warn!(
                    "task [{}] container was already cleaned up, not risking creation of subsequent tasks",
                    self.spec.name
                );
                return Ok(Vec::new());
            }
        };

        let inspection = self.adapter.inspect(&id).await?;
        if inspection.running {
            return Err(DriverError::StillRunning {
                name: self.spec.name.clone(),
            });
        }

        info!("task [{}] exited with exit code {}", self.spec.name, inspection.exit_code);
        if inspection.exit_code == 0 {
            Ok(self.spec.on_success.clone())
        } else {
            Ok(self.spec.on_failure.clone())
        }
    }
}
