//! Loads the configuration, initializes logging and builds the container.
use peerhub_configuration::{Configuration, Info};

use crate::container::AppContainer;

/// Sets up the process-wide services.
///
/// # Panics
///
/// Panics when the configuration cannot be loaded or is invalid. This is a
/// startup failure: the process exits non-zero before any socket is bound.
#[must_use]
pub fn setup(info: &Info) -> (Configuration, AppContainer) {
    let configuration = Configuration::load(info).expect("configuration to be valid");

    initialize_logging();

    tracing::info!("configuration loaded");

    let app_container = AppContainer::initialize(&configuration);

    (configuration, app_container)
}

fn initialize_logging() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
}
