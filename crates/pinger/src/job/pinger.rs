use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::RuntimeOps;
use crate::conf::PingerConfig;
use crate::inventory::{collect, probe_targets};
use crate::metrics::CycleMetrics;
use crate::probe::{ProbeOutcome, Prober};
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::report::{self, Delivery, Reporter};

use super::cycle::{CycleError, CycleState, CycleSummary};

/// Fatal cycles in a row before the loop starts shouting.
const FATAL_STREAK_ALERT: u64 = 3;

/// The reachability loop: reconcile, collect, probe, report, sleep.
///
/// Exactly one instance runs per process. All state that matters lives in
/// the runtime and the backend; the loop itself only keeps counters.
pub struct Pinger {
    runtime: Arc<dyn RuntimeOps>,
    prober: Arc<dyn Prober>,
    reporter: Arc<dyn Reporter>,
    reconciler: Reconciler,
    config: PingerConfig,
    metrics: CycleMetrics,
}

impl Pinger {
    pub fn new(
        runtime: Arc<dyn RuntimeOps>,
        prober: Arc<dyn Prober>,
        reporter: Arc<dyn Reporter>,
        config: PingerConfig,
    ) -> Self {
        let reconciler = Reconciler::new(
            Arc::clone(&runtime),
            config.network.clone(),
            config.restart_on_attach,
            config.restart_timeout_secs,
        );

        Self {
            runtime,
            prober,
            reporter,
            reconciler,
            config,
            metrics: CycleMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &PingerConfig {
        &self.config
    }

    /// Run cycles until `cancel` fires.
    ///
    /// Cycle errors never escape: a fatal cycle is logged and retried after
    /// the regular interval.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            network = %self.config.network,
            backend = %self.config.backend_url,
            interval_secs = self.config.interval_secs,
            "Pinger loop started"
        );

        while !cancel.is_cancelled() {
            match self.run_cycle(&cancel).await {
                Ok(summary) => {
                    self.metrics.cycle_completed();
                    info!(
                        attached = summary.reconcile.attach_count(),
                        discovered = summary.discovered,
                        probed = summary.probed,
                        succeeded = summary.succeeded,
                        delivered = summary.delivered,
                        created = summary.created,
                        report_failures = summary.report_failures,
                        "Cycle complete"
                    );
                }
                Err(CycleError::Cancelled) => break,
                Err(CycleError::Runtime(e)) => {
                    let streak = self.metrics.cycle_failed();
                    if streak >= FATAL_STREAK_ALERT {
                        error!(error = %e, consecutive = streak, "Runtime has failed {} cycles in a row - check daemon health", streak);
                    } else {
                        warn!(error = %e, consecutive = streak, "Cycle aborted");
                    }
                }
            }

            transition(CycleState::Sleeping);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval()) => {}
            }
        }

        info!("Pinger loop stopped");
        self.metrics.print_summary();
    }

    /// One pass through Reconciling → Collecting → Probing → Reporting.
    ///
    /// Every blocking step races `cancel`; a cancelled step is dropped and
    /// the cycle returns [`CycleError::Cancelled`].
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleSummary, CycleError> {
        transition(CycleState::Reconciling);
        let reconcile = match until_cancelled(cancel, self.reconciler.reconcile()).await? {
            Ok(report) => report,
            Err(e) if e.is_fatal() => return Err(CycleError::Runtime(e.into_docker_error())),
            Err(e) => {
                warn!(network = %self.config.network, error = %e, "Reconciliation skipped this cycle");
                ReconcileReport::default()
            }
        };
        self.metrics.reconciled(&reconcile);

        transition(CycleState::Collecting);
        let containers = match until_cancelled(cancel, collect(self.runtime.as_ref(), &self.config.network)).await? {
            Ok(containers) => containers,
            Err(e) if e.is_unreachable() => return Err(CycleError::Runtime(e)),
            Err(e) => {
                warn!(network = %self.config.network, error = %e, "Container listing failed, nothing to probe this cycle");
                Vec::new()
            }
        };
        let targets = probe_targets(&containers);
        debug!(discovered = containers.len(), targets = targets.len(), "Probe set built");

        transition(CycleState::Probing);
        let outcomes = until_cancelled(cancel, self.probe_all(targets)).await?;

        transition(CycleState::Reporting);
        let mut summary = CycleSummary {
            reconcile,
            discovered: containers.len(),
            probed: outcomes.len(),
            ..Default::default()
        };

        for outcome in &outcomes {
            if outcome.success {
                summary.succeeded += 1;
            }
            match until_cancelled(cancel, report::report(self.reporter.as_ref(), outcome)).await? {
                Ok(Delivery::Skipped) => {}
                Ok(Delivery::Delivered { created }) => {
                    self.metrics.report_delivered();
                    summary.delivered += 1;
                    if created {
                        summary.created += 1;
                    }
                    debug!(address = %outcome.address, created, "Report delivered");
                }
                Err(e) => {
                    self.metrics.report_failed();
                    summary.report_failures += 1;
                    warn!(address = %outcome.address, error = %e, "Failed to deliver report");
                }
            }
        }

        Ok(summary)
    }

    /// Probe every target, at most `probe.concurrency` at a time.
    async fn probe_all(&self, targets: Vec<String>) -> Vec<ProbeOutcome> {
        let prober = self.prober.as_ref();
        let metrics = &self.metrics;

        stream::iter(targets)
            .map(|address| async move {
                let result = prober.probe(&address).await;
                metrics.probed(result.success);
                let outcome = ProbeOutcome::new(address, result);
                info!(
                    address = %outcome.address,
                    latency_ms = outcome.rtt_ms,
                    success = outcome.success,
                    last_success = ?outcome.last_success,
                    "Probe result"
                );
                outcome
            })
            .buffer_unordered(self.config.probe.concurrency.max(1))
            .collect()
            .await
    }
}

fn transition(state: CycleState) {
    debug!(state = %state, "Cycle state");
}

/// Race `fut` against `cancel`. Cancellation wins ties.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, CycleError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CycleError::Cancelled),
        out = fut => Ok(out),
    }
}
