//! Stop — translate process signals into loop cancellation.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolve on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Cancel `token` when a shutdown signal arrives.
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received, finishing current step");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}
