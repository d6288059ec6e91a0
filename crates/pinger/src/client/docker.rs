//! Runtime trait — abstract interface for the container-runtime operations
//! the reconcile/probe loop needs.
//!
//! `live.rs` provides the real Bollard-backed implementation.
//! `fake.rs` provides a test double.

use std::pin::Pin;

use crate::docker::client::DockerError;
use crate::docker::inventory::{ContainerInfo, ContainerNetworks, NetworkInfo};

/// Unified async interface over the container runtime.
///
/// Object-safe thanks to `Pin<Box<…>>` returns.
/// Implementations must be `Send + Sync` so they can live inside an `Arc`.
pub trait RuntimeOps: Send + Sync {
    // ── Containers ──────────────────────────────────────────────

    fn list_running_containers(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>>;

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerNetworks, DockerError>> + Send + 'a>>;

    fn restart_container<'a>(
        &'a self,
        container_id: &'a str,
        timeout_secs: Option<u32>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>>;

    // ── Networks ────────────────────────────────────────────────

    fn inspect_network<'a>(
        &'a self,
        network: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<NetworkInfo, DockerError>> + Send + 'a>>;

    fn create_network<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>>;

    fn connect_network<'a>(
        &'a self,
        network: &'a str,
        container_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>>;
}
