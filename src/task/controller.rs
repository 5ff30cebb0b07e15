//! The controller facade (spec §4.5): the public `start`/`stop`/`running` actions, and
//! the [`Module`] contract a dispatch fabric would call through.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Configuration;
use crate::error::ControllerError;
use crate::module::Module;
use crate::runtime::ContainerRuntimeAdapter;

use super::driver::TaskDriver;
use super::registry::RunningRegistry;
use super::spec::TaskSpec;
use super::store::TaskStore;
use super::supervisor;

const MODULE_NAME: &str = "task";

/// Decoded `{"name": "<task>"}` action payload (spec §6).
#[derive(Debug, Deserialize)]
struct NamePayload {
    name: String,
}

/// Minimal success response body, `{"message":"OK"}`.
#[derive(Debug, Serialize)]
struct OkResponse {
    message: &'static str,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { message: "OK" }
    }
}

/// Response body for the `running` action.
#[derive(Debug, Serialize)]
struct RunningResponse {
    message: &'static str,
    tasks: Vec<String>,
}

struct Inner<A: ContainerRuntimeAdapter> {
    store: TaskStore,
    registry: RunningRegistry,
    adapter: Arc<A>,
    poll_interval: Duration,
    stop_grace: Duration,
}

/// Public facade over the task lifecycle engine. Cheap to clone — holds an `Arc`
/// internally, the same shape as `server::Manager`/`Arc<Server>` in the crate this
/// workspace was built from, so a supervisor can hold a full `Controller` and
/// recursively call `start()` on successors without extra reference-counting
/// ceremony at the call site.
pub struct Controller<A: ContainerRuntimeAdapter> {
    inner: Arc<Inner<A>>,
}

impl<A: ContainerRuntimeAdapter> Clone for Controller<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: ContainerRuntimeAdapter + 'static> Controller<A> {
    /// Loads task definitions from `config.task_directory`, optionally pulling each
    /// image, and attaches a supervisor to any task whose container is already
    /// running (spec §2 — "hooking into already running task").
    pub async fn load(config: &Configuration, adapter: Arc<A>) -> Result<Self, ControllerError> {
        let store = TaskStore::load(&config.task_directory)?;
        let controller = Self {
            inner: Arc::new(Inner {
                store,
                registry: RunningRegistry::new(),
                adapter,
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                stop_grace: Duration::from_secs(config.stop_grace_seconds),
            }),
        };

        for name in controller.inner.store.names() {
            let driver = controller.driver_for(&name)?;

            if config.initialize_tasks {
                driver.initialize().await.map_err(ControllerError::Driver)?;
            } else {
                tracing::debug!("task [{}]: initialization skipped per controller configuration", name);
            }
            info!("task loaded successfully: {}", name);

            if driver.is_running().await.map_err(ControllerError::Driver)? {
                info!("hooking into already running task: {}", name);
                supervisor::attach(controller.clone(), driver, controller.inner.poll_interval);
            }
        }

        info!("{} module loaded successfully", MODULE_NAME);
        Ok(controller)
    }

    /// Test/in-process constructor building a store directly from specs, bypassing
    /// disk I/O. Uses the spec's literal defaults (500ms poll, 10s stop grace).
    #[cfg(test)]
    pub fn from_parts(specs: HashMap<String, TaskSpec>, adapter: Arc<A>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: TaskStore::from_map(specs),
                registry: RunningRegistry::new(),
                adapter,
                poll_interval: supervisor::POLL_INTERVAL,
                stop_grace: Duration::from_secs(10),
            }),
        }
    }

    pub(super) fn registry(&self) -> &RunningRegistry {
        &self.inner.registry
    }

    fn driver_for(&self, name: &str) -> Result<Arc<TaskDriver<A>>, ControllerError> {
        let spec = self.inner.store.get(name)?;
        Ok(Arc::new(TaskDriver::new(
            (*spec).clone(),
            self.inner.adapter.clone(),
            self.inner.stop_grace,
        )))
    }

    /// `start { name }`: drives the container up (unless already running) and
    /// attaches a supervisor. At-most-once supervision is enforced by the registry's
    /// attach procedure, not by this method.
    pub async fn start(&self, name: &str) -> Result<(), ControllerError> {
        let driver = self.driver_for(name)?;

        if driver.is_running().await.map_err(ControllerError::Driver)? {
            info!("task [{}] is already running", name);
        } else {
            driver.start().await.map_err(ControllerError::Driver)?;
        }

        supervisor::attach(self.clone(), driver, self.inner.poll_interval);
        Ok(())
    }

    /// `stop { name }`: a no-op if the task is not running. Never touches the
    /// registry directly — the owning supervisor notices the container went away on
    /// its next poll and proceeds through DRAINING/CLEANING itself.
    pub async fn stop(&self, name: &str) -> Result<(), ControllerError> {
        let driver = self.driver_for(name)?;

        if !driver.is_running().await.map_err(ControllerError::Driver)? {
            info!("task [{}] is not running", name);
            return Ok(());
        }

        driver.stop().await.map_err(ControllerError::Driver)
    }

    /// `running {}`: task names currently under supervision.
    pub fn running_tasks(&self) -> Vec<String> {
        self.inner.registry.names()
    }
}

#[async_trait::async_trait]
impl<A: ContainerRuntimeAdapter + 'static> Module for Controller<A> {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn actions(&self) -> &'static [&'static str] {
        &["start", "stop", "running"]
    }

    async fn execute(&self, action: &str, payload: serde_json::Value) -> Result<serde_json::Value, ControllerError> {
        match action {
            "start" => {
                let args: NamePayload = serde_json::from_value(payload)
                    .map_err(|e| ControllerError::InvalidPayload(e.to_string()))?;
                self.start(&args.name).await?;
                Ok(serde_json::to_value(OkResponse::default()).expect("serializes"))
            }
            "stop" => {
                let args: NamePayload = serde_json::from_value(payload)
                    .map_err(|e| ControllerError::InvalidPayload(e.to_string()))?;
                self.stop(&args.name).await?;
                Ok(serde_json::to_value(OkResponse::default()).expect("serializes"))
            }
            "running" => Ok(serde_json::to_value(RunningResponse {
                message: "OK",
                tasks: self.running_tasks(),
            })
            .expect("serializes")),
            other => Err(ControllerError::UnknownAction(other.to_string())),
        }
    }
}
