//! Starts one HTTP tracker instance.
use peerhub_configuration::HttpTracker;
use peerhub_http_server::server::{self, Started};

use crate::container::AppContainer;

/// Starts the HTTP tracker described by one configuration section.
///
/// # Panics
///
/// Panics when the server cannot bind. This is a startup failure and the
/// process exits non-zero.
pub async fn start_job(config: &HttpTracker, app_container: &AppContainer) -> Started {
    let services = app_container.http_tracker_services();

    server::start(config.bind_address, config.request_timeout(), services)
        .await
        .expect("HTTP tracker to bind to its configured address")
}
