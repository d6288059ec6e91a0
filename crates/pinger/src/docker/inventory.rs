use std::collections::{HashMap, HashSet};

use bollard::models::{ContainerInspectResponse, ContainerSummary, NetworkInspect};

/// Basic container information derived from Docker's list API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainerInfo {
    pub id: String,         // Full container ID 64-char hash
    pub name: String,       // Without leading slash
    pub image: String,
    pub state: String,      // "running", "paused", "exited"
    pub status: String,     // "Up 2 hours"
}

impl From<ContainerSummary> for ContainerInfo {
    fn from(s: ContainerSummary) -> Self {
        Self {
            id: s.id.unwrap_or_default(),
            name: s.names.as_deref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/'))
                .unwrap_or("unknown")
                .to_string(),
            image: s.image.unwrap_or_default(),
            state: s.state
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into()),
            status: s.status.unwrap_or_default(),
        }
    }
}

/// Per-network addresses of a single container, from docker inspect.
///
/// `attachments` maps network name → IP address. The address is empty when
/// the container is attached but the network config has not been applied yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerNetworks {
    pub id: String,
    pub attachments: HashMap<String, String>,
}

impl From<ContainerInspectResponse> for ContainerNetworks {
    fn from(details: ContainerInspectResponse) -> Self {
        // Path: NetworkSettings -> Networks -> <name> -> IPAddress
        let attachments = details.network_settings
            .and_then(|ns| ns.networks)
            .map(|networks| {
                networks.into_iter()
                    .map(|(name, endpoint)| (name, endpoint.ip_address.unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: details.id.unwrap_or_default(),
            attachments,
        }
    }
}

/// A network and the IDs of the containers currently attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    pub members: HashSet<String>,
}

impl NetworkInfo {
    pub fn is_member(&self, container_id: &str) -> bool {
        self.members.contains(container_id)
    }
}

impl From<NetworkInspect> for NetworkInfo {
    fn from(net: NetworkInspect) -> Self {
        Self {
            id: net.id.unwrap_or_default(),
            name: net.name.unwrap_or_default(),
            members: net.containers
                .map(|containers| containers.into_keys().collect())
                .unwrap_or_default(),
        }
    }
}
