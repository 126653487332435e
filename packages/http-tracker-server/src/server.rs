//! Starts and stops the HTTP tracker.
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tower_http::timeout::TimeoutLayer;

use crate::container::HttpTrackerServices;
use crate::routes;
use crate::signals::{self, Halted};

/// A running HTTP tracker instance.
pub struct Started {
    /// The resolved local address (useful when binding to port 0).
    pub binding: SocketAddr,

    /// Triggers a graceful shutdown when fired (or dropped).
    pub halt: tokio::sync::oneshot::Sender<Halted>,

    /// The server task. It finishes after the graceful shutdown drains.
    pub task: JoinHandle<()>,
}

impl Started {
    /// Asks the server to stop and waits for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the server task panicked.
    pub async fn stop(self) -> Result<(), tokio::task::JoinError> {
        // A dropped receiver also counts as a halt, so the send result does
        // not matter.
        let _halt_result = self.halt.send(Halted::Normal);

        self.task.await
    }
}

/// Binds the listener and starts serving.
///
/// Each request runs in its own task; the timeout layer bounds the whole
/// request lifetime.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn start(
    bind_address: SocketAddr,
    request_timeout: Duration,
    services: Arc<HttpTrackerServices>,
) -> io::Result<Started> {
    let app = routes::router(services).layer(TimeoutLayer::new(request_timeout));

    let handle = axum_server::Handle::new();

    let (tx_halt, rx_halt) = tokio::sync::oneshot::channel::<Halted>();

    tokio::spawn(signals::graceful_shutdown(
        handle.clone(),
        rx_halt,
        format!("shutting down HTTP tracker on {bind_address}"),
        bind_address,
    ));

    let server = axum_server::bind(bind_address).handle(handle.clone());

    let task = tokio::spawn(async move {
        if let Err(error) = server
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
        {
            tracing::error!(target: crate::HTTP_TRACKER_LOG_TARGET, %error, "HTTP tracker stopped serving");
        }
    });

    let Some(binding) = handle.listening().await else {
        return Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            format!("could not bind HTTP tracker to {bind_address}"),
        ));
    };

    tracing::info!(target: crate::HTTP_TRACKER_LOG_TARGET, %binding, "HTTP tracker started");

    Ok(Started { binding, halt: tx_halt, task })
}
