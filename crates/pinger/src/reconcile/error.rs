use thiserror::Error;

use crate::docker::client::DockerError;

/// Why a reconciliation pass stopped early.
///
/// Each variant records the step that failed, which decides whether the
/// cycle can carry on without the pass.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to inspect network {network}: {source}")]
    InspectNetwork {
        network: String,
        #[source]
        source: DockerError,
    },
    #[error("Failed to create network {network}: {source}")]
    CreateNetwork {
        network: String,
        #[source]
        source: DockerError,
    },
    #[error("Failed to list running containers: {0}")]
    ListContainers(#[source] DockerError),
}

impl ReconcileError {
    /// A pass failure is fatal when the runtime is gone, or when the daemon
    /// answered the network inspect with anything other than "not found".
    /// Everything else only costs this pass.
    pub fn is_fatal(&self) -> bool {
        match self {
            ReconcileError::InspectNetwork { .. } => true,
            other => other.docker_error().is_unreachable(),
        }
    }

    pub fn docker_error(&self) -> &DockerError {
        match self {
            ReconcileError::InspectNetwork { source, .. } => source,
            ReconcileError::CreateNetwork { source, .. } => source,
            ReconcileError::ListContainers(source) => source,
        }
    }

    pub fn into_docker_error(self) -> DockerError {
        match self {
            ReconcileError::InspectNetwork { source, .. } => source,
            ReconcileError::CreateNetwork { source, .. } => source,
            ReconcileError::ListContainers(source) => source,
        }
    }
}
