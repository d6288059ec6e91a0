use pinger::runtime::{boot, stop};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Phase 1: basic logging until the config says which format to use
    let basic_logging = boot::init_logging_basic();

    info!("Starting pinger v{}", env!("CARGO_PKG_VERSION"));
    let config = boot::load_config()?;

    // Phase 2: global subscriber with the configured format
    drop(basic_logging);
    boot::init_logging(config.log_format);

    let pinger = boot::boot(config).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(stop::cancel_on_signal(cancel.clone()));

    pinger.run(cancel).await;
    Ok(())
}
