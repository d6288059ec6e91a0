//! Boot: logging init, config load, Docker connection, loop assembly.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{LogFormat, PingerConfig};
use crate::docker::client::DockerClient;
use crate::job::Pinger;
use crate::probe::IcmpProber;
use crate::report::HttpReporter;

/// Phase 1: plain logging for this thread while the config loads.
///
/// Drop the guard before calling [`init_logging`].
pub fn init_logging_basic() -> tracing::subscriber::DefaultGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pinger=info".into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: install the global subscriber in the configured format.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pinger=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Load configuration (file, then env) and validate it.
pub fn load_config() -> Result<PingerConfig, Box<dyn std::error::Error>> {
    let config = PingerConfig::load()?;
    config.validate()?;
    Ok(config)
}

/// Connect to Docker, open the ICMP sockets and assemble the loop.
pub async fn boot(config: PingerConfig) -> Result<Pinger, Box<dyn std::error::Error>> {
    info!(
        network = %config.network,
        backend = %config.backend_url,
        interval_secs = config.interval_secs,
        "Loaded configuration"
    );
    info!(
        "Probing: attempts={}, timeout={}ms, concurrency={}",
        config.probe.attempts, config.probe.timeout_ms, config.probe.concurrency
    );

    let docker_client = DockerClient::new(&config.docker_host, config.docker_timeout_secs).map_err(|e| {
        error!("Failed to create Docker client: {}", e);
        e
    })?;
    info!("Connecting to Docker daemon at: {}", docker_client.host());

    docker_client.ping().await.map_err(|e| {
        error!("Docker daemon did not answer: {}", e);
        e
    })?;
    info!("Successfully connected to Docker daemon");

    let prober = IcmpProber::new(config.probe.attempts, config.probe.timeout()).map_err(|e| {
        error!("Failed to open ICMP socket (needs CAP_NET_RAW or ping_group_range): {}", e);
        e
    })?;

    let reporter = HttpReporter::new(&config.backend_url, config.report_timeout())?;

    Ok(Pinger::new(
        Arc::new(docker_client),
        Arc::new(prober),
        Arc::new(reporter),
        config,
    ))
}
