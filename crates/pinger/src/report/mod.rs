//! Delivery of successful probe outcomes to the backend registry.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::probe::ProbeOutcome;

pub use http::HttpReporter;

/// Body posted to `/v1/containers/{ip}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReport {
    /// Milliseconds.
    pub ping_time: u64,
    pub is_successful: bool,
    pub last_successful: DateTime<Utc>,
}

/// What happened to one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Failed probe, nothing sent.
    Skipped,
    /// Accepted by the backend. `created` is true when this was the first
    /// record for the address.
    Delivered { created: bool },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Backend unreachable: {0}")]
    Transport(String),
    #[error("Backend rejected report with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Sends one report for one address to the backend.
pub trait Reporter: Send + Sync {
    fn deliver<'a>(
        &'a self,
        ip: &'a str,
        report: &'a PingReport,
    ) -> Pin<Box<dyn Future<Output = Result<Delivery, ReportError>> + Send + 'a>>;
}

/// Report an outcome, sending only successes.
///
/// `last_successful` is stamped here, at report generation time.
pub async fn report(reporter: &dyn Reporter, outcome: &ProbeOutcome) -> Result<Delivery, ReportError> {
    if !outcome.success {
        debug!(address = %outcome.address, "Probe failed, not reporting");
        return Ok(Delivery::Skipped);
    }

    let payload = PingReport {
        ping_time: outcome.rtt_ms,
        is_successful: true,
        last_successful: Utc::now(),
    };
    reporter.deliver(&outcome.address, &payload).await
}
