//! Live — implements `RuntimeOps` for the real Bollard-backed `DockerClient`.

use std::pin::Pin;

use crate::client::docker::RuntimeOps;
use crate::docker::client::{DockerClient, DockerError};
use crate::docker::inventory::{ContainerInfo, ContainerNetworks, NetworkInfo};

impl RuntimeOps for DockerClient {
    // ── Containers ──────────────────────────────────────────────

    fn list_running_containers(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>> {
        Box::pin(self.list_running_containers())
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerNetworks, DockerError>> + Send + 'a>> {
        Box::pin(self.inspect_container_networks(id))
    }

    fn restart_container<'a>(
        &'a self,
        container_id: &'a str,
        timeout_secs: Option<u32>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(self.restart_container(container_id, timeout_secs))
    }

    // ── Networks ────────────────────────────────────────────────

    fn inspect_network<'a>(
        &'a self,
        network: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<NetworkInfo, DockerError>> + Send + 'a>> {
        Box::pin(self.inspect_network(network))
    }

    fn create_network<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(self.create_network(name))
    }

    fn connect_network<'a>(
        &'a self,
        network: &'a str,
        container_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(self.network_connect(network, container_id))
    }
}
