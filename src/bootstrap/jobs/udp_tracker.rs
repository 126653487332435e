//! Starts one UDP tracker instance together with its cookie rotation.
use std::sync::Arc;

use peerhub_configuration::UdpTracker;
use peerhub_udp_server::connection_cookie::ConnectionCookie;
use peerhub_udp_server::server::{self, Started};
use tokio_util::sync::CancellationToken;

use crate::bootstrap::jobs::cookie_rotation;
use crate::container::AppContainer;

/// Starts the UDP tracker described by one configuration section.
///
/// Each instance gets its own connection cookie; the companion rotation job
/// replaces the cookie IV every `cookie_lifetime`.
///
/// # Panics
///
/// Panics when the socket cannot be bound. This is a startup failure and the
/// process exits non-zero.
pub async fn start_job(
    config: &UdpTracker,
    app_container: &AppContainer,
    cancellation_token: CancellationToken,
) -> (Started, tokio::task::JoinHandle<()>) {
    let connection_cookie = Arc::new(ConnectionCookie::new());

    let services = app_container.udp_tracker_services(connection_cookie.clone());

    let started = server::start(config.bind_address, services, cancellation_token.clone())
        .await
        .expect("UDP tracker to bind to its configured address");

    let rotation_job = cookie_rotation::start_job(connection_cookie, config.cookie_lifetime(), cancellation_token);

    (started, rotation_job)
}
