use std::collections::HashSet;

use tracing::{debug, warn};

use crate::client::RuntimeOps;
use crate::docker::client::DockerError;

use super::resolve::resolve_address;

/// A running container as seen in one cycle. Never cached across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredContainer {
    pub id: String,
    pub image: String,
    pub status: String,
    /// Address on the designated network; empty when none is assigned yet.
    pub ip: String,
}

/// List running containers attached to `network`, with their resolved address.
///
/// A failed listing aborts the collection (the daemon is the source of truth
/// and there is nothing to fall back on). A failed per-container inspect only
/// skips that container.
pub async fn collect(
    runtime: &dyn RuntimeOps,
    network: &str,
) -> Result<Vec<DiscoveredContainer>, DockerError> {
    let containers = runtime.list_running_containers().await?;
    let mut discovered = Vec::with_capacity(containers.len());

    for container in containers {
        let details = match runtime.inspect_container(&container.id).await {
            Ok(details) => details,
            Err(e) => {
                warn!(container_id = %short_id(&container.id), error = %e, "Failed to inspect container, skipping");
                continue;
            }
        };

        let Some(ip) = resolve_address(&details.attachments, network) else {
            debug!(container_id = %short_id(&container.id), network, "Container not on designated network yet");
            continue;
        };

        discovered.push(DiscoveredContainer {
            id: container.id,
            image: container.image,
            status: container.status,
            ip,
        });
    }

    Ok(discovered)
}

/// Addresses worth probing this cycle: containers without an address are left out.
pub fn probe_targets(containers: &[DiscoveredContainer]) -> Vec<String> {
    let mut seen = HashSet::new();
    containers
        .iter()
        .filter(|c| !c.ip.is_empty() && seen.insert(c.ip.as_str()))
        .map(|c| c.ip.clone())
        .collect()
}

/// First 12 characters of a container ID, the way `docker ps` shows it.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
