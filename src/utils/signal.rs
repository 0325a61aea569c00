use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl+C (or SIGTERM on unix) and cancels `shutdown`, so long
/// running work such as dashboard aggregation stops with the server.
pub async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            #[cfg(not(windows))]
            println!();
            tracing::info!("Ctrl+C received, shutting down.");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down.");
        }
    }

    shutdown.cancel();
}
