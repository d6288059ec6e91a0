use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_secs: u64,
    /// Largest accepted request body, bytes
    pub body_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl RegistryConfig {
    /// Load configuration from registry.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Start with compile-time defaults as the foundation
        let defaults = config::Config::try_from(&RegistryConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder()
            .add_source(defaults);

        // Layer config files (overrides defaults)
        // 1. /etc/pinger/registry.toml (Docker/production)
        // 2. config/registry.toml (local development)
        // 3. crates/registry/config/registry.toml (workspace root)
        let config_paths = [
            "/etc/pinger/registry",
            "config/registry",
            "crates/registry/config/registry",
        ];

        for path in config_paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Layer environment variables (overrides everything)
        // Use double underscore for nested keys: REGISTRY__SERVER__BIND_ADDRESS
        builder = builder.add_source(
            config::Environment::with_prefix("REGISTRY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.bind_address.parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be > 0");
        }
        if self.server.body_limit == 0 {
            anyhow::bail!("server.body_limit must be > 0");
        }

        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                request_timeout_secs: 30,
                body_limit: 64 * 1024,
            },
            logging: LoggingConfig {
                level: "info,registry=debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
