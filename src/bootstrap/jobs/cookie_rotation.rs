//! Periodic connection-cookie IV rotation for one UDP tracker instance.
use std::sync::Arc;
use std::time::Duration;

use peerhub_udp_server::connection_cookie::ConnectionCookie;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns the rotation loop.
///
/// Tokens stay valid for one rotation after they were minted (the cookie
/// honors the previous IV), so a client that connected right before a
/// rotation can still announce.
#[must_use]
pub fn start_job(
    connection_cookie: Arc<ConnectionCookie>,
    cookie_lifetime: Duration,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cookie_lifetime);

        // The first tick fires immediately; the IV is already fresh.
        interval.tick().await;

        loop {
            tokio::select! {
                () = cancellation_token.cancelled() => {
                    tracing::info!("cookie rotation stopped");
                    break;
                }
                _ = interval.tick() => {
                    connection_cookie.rotate_iv();
                    tracing::debug!("connection cookie IV rotated");
                }
            }
        }
    })
}
