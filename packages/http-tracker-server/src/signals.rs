//! Graceful shutdown plumbing for the HTTP server.
use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// The reason a server is asked to halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halted {
    Normal,
}

/// Resolves when the halt channel fires (or is dropped, which counts as a
/// halt too).
pub async fn shutdown_signal_with_message(rx_halt: tokio::sync::oneshot::Receiver<Halted>, message: String) {
    let _halted = rx_halt.await;

    tracing::info!(target: crate::HTTP_TRACKER_LOG_TARGET, "{message}");
}

/// Waits for the halt signal, then drains connections before the server is
/// torn down.
pub async fn graceful_shutdown(
    handle: axum_server::Handle<SocketAddr>,
    rx_halt: tokio::sync::oneshot::Receiver<Halted>,
    message: String,
    address: SocketAddr,
) {
    shutdown_signal_with_message(rx_halt, message).await;

    let grace_period = Duration::from_secs(5);
    let max_wait = Duration::from_secs(10);
    let start = Instant::now();

    handle.graceful_shutdown(Some(grace_period));

    loop {
        if handle.connection_count() == 0 {
            tracing::info!(target: crate::HTTP_TRACKER_LOG_TARGET, %address, "all connections closed, shutting down");
            break;
        }

        if start.elapsed() >= max_wait {
            tracing::warn!(
                target: crate::HTTP_TRACKER_LOG_TARGET,
                %address,
                alive_connections = handle.connection_count(),
                "shutdown grace period exceeded, forcing shutdown"
            );
            break;
        }

        sleep(Duration::from_secs(1)).await;
    }
}
