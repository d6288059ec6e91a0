//! Network domain — inspect, create, connect.

use std::collections::HashMap;

use super::client::{map_not_found, DockerClient, DockerError};
use super::inventory::NetworkInfo;

/// Label put on every network this process creates.
pub const MANAGED_BY_LABEL: (&str, &str) = ("managed-by", "pinger");

impl DockerClient {
    /// Inspect a network by name or ID.
    ///
    /// A missing network is reported as [`DockerError::NetworkNotFound`] so
    /// callers can tell it apart from a daemon failure.
    pub async fn inspect_network(&self, network: &str) -> Result<NetworkInfo, DockerError> {
        self.client
            .inspect_network(
                network,
                None::<bollard::query_parameters::InspectNetworkOptions>,
            )
            .await
            .map(NetworkInfo::from)
            .map_err(|e| map_not_found(e, || DockerError::NetworkNotFound(network.to_string())))
    }

    /// Create a bridge network.
    pub async fn create_network(&self, name: &str) -> Result<(), DockerError> {
        use bollard::models::NetworkCreateRequest;

        let labels = HashMap::from([(
            MANAGED_BY_LABEL.0.to_string(),
            MANAGED_BY_LABEL.1.to_string(),
        )]);

        let config = NetworkCreateRequest {
            name: name.to_string(),
            driver: Some("bridge".to_string()),
            labels: Some(labels),
            ..Default::default()
        };

        self.client
            .create_network(config)
            .await
            .map(|_| ())
            .map_err(DockerError::from)
    }

    /// Connect a container to a network.
    pub async fn network_connect(
        &self,
        network: &str,
        container_id: &str,
    ) -> Result<(), DockerError> {
        use bollard::models::NetworkConnectRequest;

        let config = NetworkConnectRequest {
            container: container_id.to_string(),
            ..Default::default()
        };

        self.client
            .connect_network(network, config)
            .await
            .map_err(DockerError::from)
    }
}
