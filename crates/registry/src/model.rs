use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub ip: String,
    /// Latest observed probe latency, milliseconds.
    pub ping_time: u64,
    /// `None` until the first successful probe is reported.
    pub last_successful: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/containers/{ip}`, as sent by the pinger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReport {
    pub ping_time: u64,
    pub is_successful: bool,
    pub last_successful: DateTime<Utc>,
}

/// Body of `POST /v1/containers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddContainerRequest {
    pub ip: String,
    pub ping_time: u64,
    pub last_successful: Option<DateTime<Utc>>,
}

/// Body of `PUT /v1/containers/{ip}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContainerRequest {
    pub ping_time: u64,
    pub last_successful: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContainerResponse {
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteContainerResponse {
    pub is_success: bool,
}
