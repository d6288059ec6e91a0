use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::reconcile::ReconcileReport;

/// Cycle metrics tracker
#[derive(Clone)]
pub struct CycleMetrics {
    inner: Arc<CycleMetricsInner>,
}

#[derive(Default)]
struct CycleMetricsInner {
    cycles: AtomicU64,
    fatal_cycles: AtomicU64,
    /// Reset by every cycle that completes
    consecutive_fatal: AtomicU64,

    attached: AtomicU64,
    activated: AtomicU64,
    activation_failed: AtomicU64,

    probes_succeeded: AtomicU64,
    probes_failed: AtomicU64,

    reports_delivered: AtomicU64,
    reports_failed: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub fatal_cycles: u64,
    pub consecutive_fatal: u64,
    pub attached: u64,
    pub activated: u64,
    pub activation_failed: u64,
    pub probes_succeeded: u64,
    pub probes_failed: u64,
    pub reports_delivered: u64,
    pub reports_failed: u64,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CycleMetricsInner::default()),
        }
    }

    /// Called when a cycle runs to the end; clears the fatal streak.
    pub fn cycle_completed(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
        self.inner.consecutive_fatal.store(0, Ordering::Relaxed);
    }

    /// Called when a cycle aborts. Returns the length of the current fatal streak.
    pub fn cycle_failed(&self) -> u64 {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
        self.inner.fatal_cycles.fetch_add(1, Ordering::Relaxed);
        self.inner.consecutive_fatal.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reconciled(&self, report: &ReconcileReport) {
        self.inner.attached.fetch_add(report.attach_count() as u64, Ordering::Relaxed);
        self.inner.activated.fetch_add(report.activated_count() as u64, Ordering::Relaxed);
        self.inner.activation_failed.fetch_add(report.activation_failed_count() as u64, Ordering::Relaxed);
    }

    pub fn probed(&self, success: bool) {
        let counter = if success {
            &self.inner.probes_succeeded
        } else {
            &self.inner.probes_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report_delivered(&self) {
        self.inner.reports_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report_failed(&self) {
        self.inner.reports_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let inner = &self.inner;
        MetricsSnapshot {
            cycles: load(&inner.cycles),
            fatal_cycles: load(&inner.fatal_cycles),
            consecutive_fatal: load(&inner.consecutive_fatal),
            attached: load(&inner.attached),
            activated: load(&inner.activated),
            activation_failed: load(&inner.activation_failed),
            probes_succeeded: load(&inner.probes_succeeded),
            probes_failed: load(&inner.probes_failed),
            reports_delivered: load(&inner.reports_delivered),
            reports_failed: load(&inner.reports_failed),
        }
    }

    /// Log the lifetime totals
    pub fn print_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            cycles = s.cycles,
            fatal_cycles = s.fatal_cycles,
            attached = s.attached,
            activated = s.activated,
            activation_failed = s.activation_failed,
            probes_succeeded = s.probes_succeeded,
            probes_failed = s.probes_failed,
            reports_delivered = s.reports_delivered,
            reports_failed = s.reports_failed,
            "Pinger metrics summary"
        );
    }
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::AttachOutcome;

    #[test]
    fn test_fatal_streak_resets_on_success() {
        let metrics = CycleMetrics::new();
        assert_eq!(metrics.cycle_failed(), 1);
        assert_eq!(metrics.cycle_failed(), 2);
        metrics.cycle_completed();
        assert_eq!(metrics.cycle_failed(), 1);

        let s = metrics.snapshot();
        assert_eq!(s.cycles, 4);
        assert_eq!(s.fatal_cycles, 3);
        assert_eq!(s.consecutive_fatal, 1);
    }

    #[test]
    fn test_reconcile_counters() {
        let metrics = CycleMetrics::new();
        metrics.reconciled(&ReconcileReport {
            attached: vec![
                ("a".into(), AttachOutcome::Activated),
                ("b".into(), AttachOutcome::ActivationFailed { error: "x".into() }),
            ],
            ..Default::default()
        });

        let s = metrics.snapshot();
        assert_eq!(s.attached, 2);
        assert_eq!(s.activated, 1);
        assert_eq!(s.activation_failed, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CycleMetrics::new();
        let other = metrics.clone();
        other.probed(true);
        other.probed(false);
        other.report_delivered();
        assert_eq!(metrics.snapshot().probes_succeeded, 1);
        assert_eq!(metrics.snapshot().probes_failed, 1);
        assert_eq!(metrics.snapshot().reports_delivered, 1);
    }
}
