//! The HTTP tracker routes.
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::container::HttpTrackerServices;
use crate::v1::handlers::{announce, health_check, scrape};

/// Builds the axum application.
///
/// The `/{key}` aliases exist for private mode deployments where every
/// client carries a personal passkey in the path.
#[must_use]
pub fn router(services: Arc<HttpTrackerServices>) -> Router {
    Router::new()
        .route("/health_check", get(health_check::handle_health_check))
        .route("/announce", get(announce::handle_without_key))
        .route("/announce/{key}", get(announce::handle_with_key))
        .route("/scrape", get(scrape::handle_without_key))
        .route("/scrape/{key}", get(scrape::handle_with_key))
        .with_state(services)
}
