//! Bounded-time reachability checks against container addresses.

pub mod icmp;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

pub use icmp::IcmpProber;

/// Raw result of one probe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// Wall-clock time of the whole probe operation, 0 on failure.
    pub latency_ms: u64,
    pub success: bool,
}

impl ProbeResult {
    pub fn succeeded(latency_ms: u64) -> Self {
        Self { latency_ms, success: true }
    }

    pub fn failed() -> Self {
        Self { latency_ms: 0, success: false }
    }
}

/// A probed address and what came back. One per address per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub address: String,
    pub rtt_ms: u64,
    pub success: bool,
    /// When the probe completed, if it succeeded.
    pub last_success: Option<DateTime<Utc>>,
}

impl ProbeOutcome {
    pub fn new(address: impl Into<String>, result: ProbeResult) -> Self {
        Self {
            address: address.into(),
            rtt_ms: result.latency_ms,
            success: result.success,
            last_success: result.success.then(Utc::now),
        }
    }
}

/// Issues a reachability probe to an address.
///
/// Implementations never fail: tooling problems (unresolvable address, no
/// socket) come back as [`ProbeResult::failed`].
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, address: &'a str) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + 'a>>;
}
