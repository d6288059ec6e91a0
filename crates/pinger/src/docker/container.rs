//! Container domain — running-container listing, network inspect, restart.

use super::client::{map_not_found, DockerClient, DockerError};
use super::inventory::{ContainerInfo, ContainerNetworks};

use bollard::query_parameters::{ListContainersOptions, RestartContainerOptions};

impl DockerClient {
    /// List running containers only (stopped containers cannot be probed).
    pub async fn list_running_containers(&self) -> Result<Vec<ContainerInfo>, DockerError> {
        let options = Some(ListContainersOptions {
            all: false,
            ..Default::default()
        });
        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(|c| c.into()).collect())
    }

    /// Inspect a container and return its per-network addresses.
    pub async fn inspect_container_networks(&self, id: &str) -> Result<ContainerNetworks, DockerError> {
        self.client
            .inspect_container(id, None)
            .await
            .map(ContainerNetworks::from)
            .map_err(|e| map_not_found(e, || DockerError::ContainerNotFound(id.to_string())))
    }

    /// Restart a container with an optional timeout (in seconds).
    pub async fn restart_container(
        &self,
        container_id: &str,
        timeout_secs: Option<u32>,
    ) -> Result<(), DockerError> {
        let options = timeout_secs.map(|t| RestartContainerOptions {
            t: Some(t as i32),
            ..Default::default()
        });

        self.client
            .restart_container(container_id, options)
            .await
            .map_err(|e| map_not_found(e, || DockerError::ContainerNotFound(container_id.to_string())))
    }
}
