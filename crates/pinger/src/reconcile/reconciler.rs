use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::RuntimeOps;
use crate::docker::client::DockerError;
use crate::docker::inventory::NetworkInfo;
use crate::inventory::collect::short_id;

use super::error::ReconcileError;
use super::outcome::{AttachOutcome, ReconcileReport};

/// Keeps every running container attached to one designated network.
///
/// Membership is read from the runtime on every pass and never cached:
/// operators and other tooling may change it between cycles.
pub struct Reconciler {
    runtime: Arc<dyn RuntimeOps>,
    network: String,
    restart_on_attach: bool,
    restart_timeout_secs: Option<u32>,
}

impl Reconciler {
    pub fn new(
        runtime: Arc<dyn RuntimeOps>,
        network: impl Into<String>,
        restart_on_attach: bool,
        restart_timeout_secs: Option<u32>,
    ) -> Self {
        Self {
            runtime,
            network: network.into(),
            restart_on_attach,
            restart_timeout_secs,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Inspect the designated network, creating it when absent.
    ///
    /// Returns the network and whether it was created by this call. A 409 on
    /// create means another client created it first; the network is then
    /// inspected again and used as found.
    pub async fn ensure_network(&self) -> Result<(NetworkInfo, bool), ReconcileError> {
        match self.runtime.inspect_network(&self.network).await {
            Ok(network) => {
                debug!(network = %self.network, members = network.members.len(), "Network exists");
                Ok((network, false))
            }
            Err(DockerError::NetworkNotFound(_)) => {
                let created = match self.runtime.create_network(&self.network).await {
                    Ok(()) => {
                        info!(network = %self.network, "Network created");
                        true
                    }
                    Err(e) if e.is_conflict() => {
                        debug!(network = %self.network, "Network created concurrently");
                        false
                    }
                    Err(source) => {
                        return Err(ReconcileError::CreateNetwork {
                            network: self.network.clone(),
                            source,
                        })
                    }
                };
                let network = self.inspect().await?;
                Ok((network, created))
            }
            Err(source) => Err(ReconcileError::InspectNetwork {
                network: self.network.clone(),
                source,
            }),
        }
    }

    async fn inspect(&self) -> Result<NetworkInfo, ReconcileError> {
        self.runtime
            .inspect_network(&self.network)
            .await
            .map_err(|source| ReconcileError::InspectNetwork {
                network: self.network.clone(),
                source,
            })
    }

    /// Attach one container and, if configured, restart it so the new
    /// network config takes effect.
    ///
    /// An attach failure is an error; a restart failure is reported as
    /// [`AttachOutcome::ActivationFailed`] and leaves the attachment in place.
    pub async fn attach_and_activate(&self, container_id: &str) -> Result<AttachOutcome, DockerError> {
        self.runtime.connect_network(&self.network, container_id).await?;
        info!(container_id = %short_id(container_id), network = %self.network, "Container attached");

        if !self.restart_on_attach {
            return Ok(AttachOutcome::Attached);
        }

        match self.runtime.restart_container(container_id, self.restart_timeout_secs).await {
            Ok(()) => {
                info!(container_id = %short_id(container_id), "Container restarted");
                Ok(AttachOutcome::Activated)
            }
            Err(e) => {
                warn!(container_id = %short_id(container_id), error = %e, "Container attached but restart failed");
                Ok(AttachOutcome::ActivationFailed { error: e.to_string() })
            }
        }
    }

    /// One reconciliation pass.
    ///
    /// Fails only when the network cannot be inspected or created, or the
    /// container list cannot be read. Per-container failures are collected
    /// into the report. Processing order does not affect the end state.
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let (network, network_created) = self.ensure_network().await?;
        let containers = self
            .runtime
            .list_running_containers()
            .await
            .map_err(ReconcileError::ListContainers)?;

        let mut report = ReconcileReport {
            network_created,
            ..Default::default()
        };

        for container in containers {
            if network.is_member(&container.id) {
                debug!(container_id = %short_id(&container.id), network = %self.network, "Container already attached");
                report.already_members.push(container.id);
                continue;
            }

            match self.attach_and_activate(&container.id).await {
                Ok(outcome) => report.attached.push((container.id, outcome)),
                Err(e) => {
                    warn!(container_id = %short_id(&container.id), network = %self.network, error = %e, "Failed to attach container");
                    report.attach_failures.push((container.id, e.to_string()));
                }
            }
        }

        info!(
            network = %self.network,
            created = report.network_created,
            already_members = report.already_members.len(),
            attached = report.attach_count(),
            activated = report.activated_count(),
            activation_failed = report.activation_failed_count(),
            attach_failed = report.attach_failures.len(),
            "Reconciliation pass complete"
        );

        Ok(report)
    }
}
