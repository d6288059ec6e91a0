//! Fake — test double for runtime operations.
//!
//! Provides a deterministic [`FakeRuntime`] that implements [`RuntimeOps`]
//! using in-memory state. Useful for unit-testing the reconcile/collect
//! steps and integration tests without a running Docker daemon.
//!
//! The fake models the one runtime quirk the loop depends on: a container
//! connected to a network gets an empty address there until it is restarted.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::pin::Pin;

use tokio::sync::Mutex;

use crate::client::docker::RuntimeOps;
use crate::docker::client::DockerError;
use crate::docker::inventory::{ContainerInfo, ContainerNetworks, NetworkInfo};

// ── In-memory state ─────────────────────────────────────────────

/// A canned container for the fake store.
#[derive(Clone, Debug)]
pub struct FakeContainer {
    pub info: ContainerInfo,
    /// network name → IP address (empty until activated by a restart)
    pub networks: HashMap<String, String>,
    pub running: bool,
}

impl FakeContainer {
    /// A running container with no network attachments.
    pub fn running(id: &str, image: &str) -> Self {
        Self {
            info: ContainerInfo {
                id: id.to_string(),
                name: format!("{}-name", id),
                image: image.to_string(),
                state: "running".to_string(),
                status: "Up 2 hours".to_string(),
            },
            networks: HashMap::new(),
            running: true,
        }
    }

    /// Attach the container to `network` with address `ip`.
    pub fn on_network(mut self, network: &str, ip: &str) -> Self {
        self.networks.insert(network.to_string(), ip.to_string());
        self
    }

    pub fn stopped(mut self) -> Self {
        self.running = false;
        self.info.state = "exited".to_string();
        self
    }
}

/// Mutable inner state protected by a mutex.
#[derive(Default)]
struct Inner {
    containers: BTreeMap<String, FakeContainer>,
    networks: HashMap<String, HashSet<String>>,
    next_ip: u8,
    unreachable: bool,
    network_inspect_error: Option<String>,
    /// Remaining `list_running_containers` calls that fail with a 500.
    list_failures: usize,
    /// Status returned by `create_network`, if it should fail.
    create_failure: Option<u16>,
    fail_inspect: HashSet<String>,
    fail_attach: HashSet<String>,
    fail_restart: HashSet<String>,
    attach_calls: Vec<String>,
    restart_calls: Vec<String>,
    networks_created: Vec<String>,
}

fn server_error(status_code: u16, message: &str) -> DockerError {
    DockerError::BollardError(bollard::errors::Error::DockerResponseServerError {
        status_code,
        message: message.to_string(),
    })
}

fn unreachable() -> DockerError {
    DockerError::ConnectionFailed("fake daemon unreachable".to_string())
}

/// A fake container runtime for deterministic testing.
///
/// All methods operate on in-memory state. The builder methods allow
/// pre-populating containers and networks and injecting failures.
pub struct FakeRuntime {
    inner: Mutex<Inner>,
}

impl FakeRuntime {
    /// Create an empty fake runtime.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Seed a container. Networks it is attached to are created implicitly.
    pub async fn add_container(&self, container: FakeContainer) {
        let mut state = self.inner.lock().await;
        for network in container.networks.keys() {
            state.networks
                .entry(network.clone())
                .or_default()
                .insert(container.info.id.clone());
        }
        state.containers.insert(container.info.id.clone(), container);
    }

    /// Seed an empty network.
    pub async fn add_network(&self, name: &str) {
        self.inner.lock().await.networks.entry(name.to_string()).or_default();
    }

    /// Detach a container behind the loop's back (an operator action).
    pub async fn detach(&self, network: &str, container_id: &str) {
        let mut state = self.inner.lock().await;
        if let Some(members) = state.networks.get_mut(network) {
            members.remove(container_id);
        }
        if let Some(c) = state.containers.get_mut(container_id) {
            c.networks.remove(network);
        }
    }

    /// Make every call fail as if the daemon socket were gone.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().await.unreachable = unreachable;
    }

    /// Make network inspection fail with a non-404 error.
    pub async fn fail_network_inspect(&self, message: &str) {
        self.inner.lock().await.network_inspect_error = Some(message.to_string());
    }

    /// Make the next `times` container listings fail with a 500 while the
    /// daemon stays reachable.
    pub async fn fail_list(&self, times: usize) {
        self.inner.lock().await.list_failures = times;
    }

    /// Make `create_network` fail with `status_code`. A 409 also creates the
    /// network, as if another client won the race.
    pub async fn fail_create_network(&self, status_code: u16) {
        self.inner.lock().await.create_failure = Some(status_code);
    }

    pub async fn fail_inspect(&self, container_id: &str) {
        self.inner.lock().await.fail_inspect.insert(container_id.to_string());
    }

    pub async fn fail_attach(&self, container_id: &str) {
        self.inner.lock().await.fail_attach.insert(container_id.to_string());
    }

    pub async fn fail_restart(&self, container_id: &str) {
        self.inner.lock().await.fail_restart.insert(container_id.to_string());
    }

    /// Container IDs passed to successful `connect_network` calls, in order.
    pub async fn attach_calls(&self) -> Vec<String> {
        self.inner.lock().await.attach_calls.clone()
    }

    /// Container IDs passed to successful `restart_container` calls, in order.
    pub async fn restart_calls(&self) -> Vec<String> {
        self.inner.lock().await.restart_calls.clone()
    }

    pub async fn networks_created(&self) -> Vec<String> {
        self.inner.lock().await.networks_created.clone()
    }

    pub async fn network_members(&self, network: &str) -> Option<HashSet<String>> {
        self.inner.lock().await.networks.get(network).cloned()
    }
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

// ── RuntimeOps implementation ───────────────────────────────────

impl RuntimeOps for FakeRuntime {
    // ── Containers ──────────────────────────────────────────────

    fn list_running_containers(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>> {
        Box::pin(async {
            let mut state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if state.list_failures > 0 {
                state.list_failures -= 1;
                return Err(server_error(500, "list failed"));
            }
            Ok(state.containers.values()
                .filter(|c| c.running)
                .map(|c| c.info.clone())
                .collect())
        })
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ContainerNetworks, DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if state.fail_inspect.contains(id) {
                return Err(server_error(500, "inspect failed"));
            }
            state.containers.get(id)
                .map(|c| ContainerNetworks {
                    id: id.to_string(),
                    attachments: c.networks.clone(),
                })
                .ok_or_else(|| DockerError::ContainerNotFound(id.to_string()))
        })
    }

    fn restart_container<'a>(
        &'a self,
        container_id: &'a str,
        _timeout_secs: Option<u32>,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if state.fail_restart.contains(container_id) {
                return Err(server_error(500, "restart failed"));
            }
            let Inner { containers, next_ip, restart_calls, .. } = &mut *state;
            let container = containers.get_mut(container_id)
                .ok_or_else(|| DockerError::ContainerNotFound(container_id.to_string()))?;

            // Pending attachments pick up an address on restart.
            for ip in container.networks.values_mut().filter(|ip| ip.is_empty()) {
                *next_ip = next_ip.wrapping_add(1);
                *ip = format!("172.28.0.{}", u16::from(*next_ip) + 1);
            }
            container.running = true;
            restart_calls.push(container_id.to_string());
            Ok(())
        })
    }

    // ── Networks ────────────────────────────────────────────────

    fn inspect_network<'a>(
        &'a self,
        network: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<NetworkInfo, DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if let Some(message) = &state.network_inspect_error {
                return Err(server_error(500, message));
            }
            state.networks.get(network)
                .map(|members| NetworkInfo {
                    id: format!("net-{}", network),
                    name: network.to_string(),
                    members: members.clone(),
                })
                .ok_or_else(|| DockerError::NetworkNotFound(network.to_string()))
        })
    }

    fn create_network<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if let Some(status_code) = state.create_failure {
                if status_code == 409 {
                    state.networks.entry(name.to_string()).or_default();
                }
                return Err(server_error(status_code, "create failed"));
            }
            if state.networks.contains_key(name) {
                return Err(server_error(409, "network already exists"));
            }
            state.networks.insert(name.to_string(), HashSet::new());
            state.networks_created.push(name.to_string());
            Ok(())
        })
    }

    fn connect_network<'a>(
        &'a self,
        network: &'a str,
        container_id: &'a str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if state.unreachable {
                return Err(unreachable());
            }
            if state.fail_attach.contains(container_id) {
                return Err(server_error(500, "attach failed"));
            }
            let Inner { containers, networks, attach_calls, .. } = &mut *state;
            let members = networks.get_mut(network)
                .ok_or_else(|| DockerError::NetworkNotFound(network.to_string()))?;
            let container = containers.get_mut(container_id)
                .ok_or_else(|| DockerError::ContainerNotFound(container_id.to_string()))?;
            if !members.insert(container_id.to_string()) {
                return Err(server_error(403, "endpoint already exists in network"));
            }
            container.networks.insert(network.to_string(), String::new());
            attach_calls.push(container_id.to_string());
            Ok(())
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_running_skips_stopped() {
        let fake = FakeRuntime::new();
        fake.add_container(FakeContainer::running("abc123", "nginx")).await;
        fake.add_container(FakeContainer::running("def456", "redis").stopped()).await;

        let containers = fake.list_running_containers().await.unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].id, "abc123");
    }

    #[tokio::test]
    async fn test_inspect_network_not_found() {
        let fake = FakeRuntime::new();
        let err = fake.inspect_network("missing").await.unwrap_err();
        assert!(matches!(err, DockerError::NetworkNotFound(_)));
    }

    #[tokio::test]
    async fn test_attach_leaves_address_pending_until_restart() {
        let fake = FakeRuntime::new();
        fake.add_network("my_network").await;
        fake.add_container(FakeContainer::running("abc123", "nginx")).await;

        fake.connect_network("my_network", "abc123").await.unwrap();
        let nets = fake.inspect_container("abc123").await.unwrap();
        assert_eq!(nets.attachments["my_network"], "");

        fake.restart_container("abc123", None).await.unwrap();
        let nets = fake.inspect_container("abc123").await.unwrap();
        assert_eq!(nets.attachments["my_network"], "172.28.0.2");
    }

    #[tokio::test]
    async fn test_double_attach_rejected() {
        let fake = FakeRuntime::new();
        fake.add_container(FakeContainer::running("abc123", "nginx").on_network("my_network", "10.0.0.2")).await;

        let result = fake.connect_network("my_network", "abc123").await;
        assert!(result.is_err());
        assert!(fake.attach_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable() {
        let fake = FakeRuntime::new();
        fake.set_unreachable(true).await;
        let err = fake.list_running_containers().await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_list_failure_is_transient() {
        let fake = FakeRuntime::new();
        fake.add_container(FakeContainer::running("abc123", "nginx")).await;
        fake.fail_list(1).await;

        let err = fake.list_running_containers().await.unwrap_err();
        assert!(!err.is_unreachable());
        assert_eq!(fake.list_running_containers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_network_twice_fails() {
        let fake = FakeRuntime::new();
        fake.create_network("my_network").await.unwrap();
        assert!(fake.create_network("my_network").await.is_err());
        assert_eq!(fake.networks_created().await, vec!["my_network".to_string()]);
    }
}
