use std::fmt;

use thiserror::Error;

use crate::docker::client::DockerError;
use crate::reconcile::ReconcileReport;

/// States of the loop, entered strictly in this cyclic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Reconciling,
    Collecting,
    Probing,
    Reporting,
    Sleeping,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Reconciling => "reconciling",
            CycleState::Collecting => "collecting",
            CycleState::Probing => "probing",
            CycleState::Reporting => "reporting",
            CycleState::Sleeping => "sleeping",
        }
    }

    pub fn next(self) -> Self {
        match self {
            CycleState::Reconciling => CycleState::Collecting,
            CycleState::Collecting => CycleState::Probing,
            CycleState::Probing => CycleState::Reporting,
            CycleState::Reporting => CycleState::Sleeping,
            CycleState::Sleeping => CycleState::Reconciling,
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a cycle stopped early.
#[derive(Error, Debug)]
pub enum CycleError {
    /// The runtime could not be reached, or the daemon failed to inspect the
    /// designated network. The cycle is abandoned and retried after the
    /// interval. Other runtime errors only cost the step they occur in.
    #[error("Runtime failure: {0}")]
    Runtime(#[from] DockerError),
    #[error("Cycle cancelled")]
    Cancelled,
}

/// What one completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub reconcile: ReconcileReport,
    /// Running containers attached to the designated network.
    pub discovered: usize,
    /// Addresses probed (discovered containers with an address).
    pub probed: usize,
    pub succeeded: usize,
    pub delivered: usize,
    /// Deliveries that created a new backend record.
    pub created: usize,
    pub report_failures: usize,
}
