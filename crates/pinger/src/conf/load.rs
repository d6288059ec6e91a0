//! Load — config loading from file and environment variables.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::model::PingerConfig;

const DEFAULT_CONFIG_FILE: &str = "/etc/pinger/pinger.toml";

impl PingerConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("PINGER_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&config_path, |key| std::env::var(key).ok())
    }

    /// Read `config_path` if it exists, then overlay `var`.
    pub fn load_from(
        config_path: &str,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if Path::new(config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(config_path)?
        } else {
            tracing::info!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_env(var);
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: PingerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay environment variables. Values that fail to parse are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("DOCKER_HOST") {
            self.docker_host = host;
        }
        if let Some(network) = var("PINGER_NETWORK") {
            self.network = network;
        }
        if let Some(url) = var("PINGER_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(secs) = parse_var(&var, "PINGER_INTERVAL_SECS") {
            self.interval_secs = secs;
        }
        if let Some(attempts) = parse_var(&var, "PINGER_PROBE_ATTEMPTS") {
            self.probe.attempts = attempts;
        }
        if let Some(ms) = parse_var(&var, "PINGER_PROBE_TIMEOUT_MS") {
            self.probe.timeout_ms = ms;
        }
        if let Some(secs) = parse_var(&var, "PINGER_REPORT_TIMEOUT_SECS") {
            self.report_timeout_secs = secs;
        }
        if let Some(n) = parse_var(&var, "PINGER_PROBE_CONCURRENCY") {
            self.probe.concurrency = n;
        }
        if let Some(restart) = parse_var(&var, "PINGER_RESTART_ON_ATTACH") {
            self.restart_on_attach = restart;
        }
        if let Some(format) = parse_var(&var, "PINGER_LOG_FORMAT") {
            self.log_format = format;
        }
    }

    /// Validate that configuration values are sane
    pub fn validate(&self) -> Result<(), String> {
        validate_network_name(&self.network)?;

        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(format!("backend_url must be an http(s) URL, got: {}", self.backend_url));
        }
        if self.interval_secs == 0 {
            return Err("interval_secs must be > 0".to_string());
        }
        if self.report_timeout_secs == 0 {
            return Err("report_timeout_secs must be > 0".to_string());
        }
        if self.docker_timeout_secs == 0 {
            return Err("docker_timeout_secs must be > 0".to_string());
        }
        self.probe.validate()?;
        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|s| s.trim().parse().ok())
}

/// Docker network names: non-empty, `[A-Za-z0-9_.-]` only.
fn validate_network_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("network must not be empty".to_string());
    }
    if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))) {
        return Err(format!("network name {:?} contains invalid character {:?}", name, c));
    }
    Ok(())
}
