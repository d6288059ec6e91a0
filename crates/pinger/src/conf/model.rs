//! Model — PingerConfig and related structs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingerConfig {
    /// Docker daemon address. Empty uses the platform default socket.
    pub docker_host: String,
    pub docker_timeout_secs: u64,
    /// The designated network every running container is attached to.
    pub network: String,
    pub backend_url: String,
    pub interval_secs: u64,
    pub report_timeout_secs: u64,
    pub restart_on_attach: bool,
    /// Grace period handed to the daemon on restart. `None` uses the daemon default.
    pub restart_timeout_secs: Option<u32>,
    pub log_format: LogFormat,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub attempts: u16,
    pub timeout_ms: u64,
    /// How many addresses are probed at once. 1 probes sequentially.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl Default for PingerConfig {
    fn default() -> Self {
        Self {
            docker_host: "".to_string(),
            docker_timeout_secs: 30,
            network: "my_network".to_string(),
            backend_url: "http://backend:8080".to_string(),
            interval_secs: 10,
            report_timeout_secs: 5,
            restart_on_attach: true,
            restart_timeout_secs: None,
            log_format: LogFormat::Pretty,
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 4,
            timeout_ms: 1000,
            concurrency: 1,
        }
    }
}

impl PingerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate probe configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.attempts == 0 {
            return Err("probe.attempts must be > 0".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("probe.timeout_ms must be > 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("probe.concurrency must be > 0".to_string());
        }
        Ok(())
    }
}
