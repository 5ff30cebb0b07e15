//! `bollard`-backed implementation of [`ContainerRuntimeAdapter`] against the Docker
//! Engine API. Grounded in `environment/docker/container.rs` and
//! `environment/docker/power.rs` from the crate this workspace was built from, pared
//! down to the operations the task driver actually needs: no attach, no stats, no
//! resource limits — just create/start/stop/remove/inspect/list.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::error::AdapterError;

use super::traits::{ContainerCreateSpec, ContainerInspection, ContainerRef, ContainerRuntimeAdapter};

/// Adapter backed by a live connection to the local Docker daemon.
pub struct DockerAdapter {
    docker: Docker,
}

impl DockerAdapter {
    /// Connect using the same defaults the Docker CLI uses (`DOCKER_HOST`, or the
    /// local socket).
    pub fn connect() -> Result<Self, AdapterError> {
        let docker = Docker::connect_with_local_defaults().map_err(AdapterError::Docker)?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntimeAdapter for DockerAdapter {
    async fn pull(&self, image: &str) -> Result<(), AdapterError> {
        debug!("pulling image: {}", image);
        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(status) = info.status {
                        debug!("pull {}: {}", image, status);
                    }
                }
                Err(e) => return Err(AdapterError::Docker(e)),
            }
        }

        info!("image [{}] is available", image);
        Ok(())
    }

    async fn create(&self, spec: &ContainerCreateSpec) -> Result<String, AdapterError> {
        let mut exposed_ports = HashMap::new();
        for port in &spec.exposed_ports {
            exposed_ports.insert(port.clone(), HashMap::new());
        }

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        for (container_port, host_port) in &spec.port_bindings {
            port_bindings.insert(
                container_port.clone(),
                Some(vec![PortBinding {
                    host_ip: Some("0.0.0.0".to_string()),
                    host_port: Some(host_port.clone()),
                }]),
            );
        }

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            binds: Some(spec.binds.clone()),
            ..Default::default()
        };

        let container_config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            env: Some(spec.env.clone()),
            exposed_ports: Some(exposed_ports),
            tty: Some(true),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(options), container_config)
            .await
            .map_err(AdapterError::Docker)?;

        info!("created container [{}]", spec.name);
        Ok(response.id)
    }

    async fn start(&self, id: &str) -> Result<(), AdapterError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(AdapterError::Docker)?;
        info!("started container [{}]", id);
        Ok(())
    }

    async fn stop(&self, id: &str, grace: Duration) -> Result<(), AdapterError> {
        let options = StopContainerOptions {
            t: grace.as_secs() as i64,
        };
        self.docker
            .stop_container(id, Some(options))
            .await
            .map_err(AdapterError::Docker)?;
        info!("stopped container [{}]", id);
        Ok(())
    }

    async fn remove(&self, id: &str, force: bool) -> Result<(), AdapterError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        match self.docker.remove_container(id, Some(options)).await {
            Ok(_) => {
                info!("removed container [{}]", id);
                Ok(())
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("container [{}] already gone, nothing to remove", id);
                Ok(())
            }
            Err(e) => Err(AdapterError::Docker(e)),
        }
    }

    async fn inspect(&self, id: &str) -> Result<ContainerInspection, AdapterError> {
        let info = self
            .docker
            .inspect_container(id, None)
            .await
            .map_err(AdapterError::Docker)?;

        let state = info.state.unwrap_or_default();
        Ok(ContainerInspection {
            running: state.running.unwrap_or(false),
            exit_code: state.exit_code.unwrap_or(0),
        })
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ContainerRef>, AdapterError> {
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), vec![name.to_string()]);

        let options = ListContainersOptions {
            all: true,
            filters,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(AdapterError::Docker)?;

        Ok(containers
            .into_iter()
            .filter_map(|c| c.id.map(|id| ContainerRef { id }))
            .collect())
    }
}
