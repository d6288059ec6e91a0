//! Docker client — core struct, constructor, error types.
//!
//! Domain methods live in sibling modules (`container`, `network`) which add
//! `impl DockerClient` blocks.

use std::time::Duration;

use bollard::Docker;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("Network not found: {0}")]
    NetworkNotFound(String),
    #[error("Bollard error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

impl DockerError {
    /// True when the daemon could not be reached at all, as opposed to the
    /// daemon answering with an error status.
    pub fn is_unreachable(&self) -> bool {
        match self {
            DockerError::ConnectionFailed(_) => true,
            DockerError::BollardError(bollard::errors::Error::DockerResponseServerError { .. }) => false,
            DockerError::BollardError(_) => true,
            DockerError::ContainerNotFound(_) | DockerError::NetworkNotFound(_) => false,
        }
    }

    /// True for a 409 from the daemon, e.g. creating a network that exists.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DockerError::BollardError(bollard::errors::Error::DockerResponseServerError { status_code: 409, .. })
        )
    }
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    /// The bollard Docker client.  `pub(super)` so that domain modules
    /// in sibling files can call bollard APIs directly.
    pub(super) client: Docker,
    /// The Docker host this client is connected to (empty = platform default).
    pub(super) host: String,
}

impl DockerClient {
    /// Connect to the daemon at `host`.
    ///
    /// - `""` → platform default socket
    /// - `tcp://…` / `http://…` → plain HTTP (e.g. `tcp://host.docker.internal:2375`)
    /// - `unix://…` or a bare path → unix socket
    ///
    /// Every request is bounded by `timeout_secs`.
    pub fn new(host: &str, timeout_secs: u64) -> Result<Self, DockerError> {
        let connection = if host.is_empty() {
            Docker::connect_with_defaults()
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
                .with_timeout(Duration::from_secs(timeout_secs))
        } else if host.starts_with("tcp://") || host.starts_with("http://") {
            Docker::connect_with_http(host, timeout_secs, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        } else {
            let clean_path = host.trim_start_matches("unix://");
            Docker::connect_with_socket(clean_path, timeout_secs, &bollard::API_DEFAULT_VERSION)
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
        };

        Ok(DockerClient {
            client: connection,
            host: host.to_string(),
        })
    }

    /// Human-readable connection target for logs.
    pub fn host(&self) -> &str {
        if self.host.is_empty() {
            "default socket"
        } else {
            &self.host
        }
    }

    /// Round-trip to the daemon; used once at boot to fail fast on a bad host.
    pub async fn ping(&self) -> Result<(), DockerError> {
        self.client
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| DockerError::ConnectionFailed(e.to_string()))
    }
}

/// Map a 404 from the daemon onto a domain "not found" error.
pub(super) fn map_not_found(
    err: bollard::errors::Error,
    not_found: impl FnOnce() -> DockerError,
) -> DockerError {
    match err {
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => not_found(),
        other => DockerError::BollardError(other),
    }
}
