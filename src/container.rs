//! Dependency wiring for the application.
use std::sync::Arc;

use peerhub_configuration::Configuration;
use peerhub_http_server::container::HttpTrackerServices;
use peerhub_swarm_registry::Registry;
use peerhub_tracker_core::announce_handler::AnnounceHandler;
use peerhub_tracker_core::scrape_handler::ScrapeHandler;
use peerhub_tracker_core::statistics;
use peerhub_tracker_core::whitelist::authorization::WhitelistAuthorization;
use peerhub_tracker_core::whitelist::repository::InMemoryWhitelist;
use peerhub_udp_server::connection_cookie::ConnectionCookie;
use peerhub_udp_server::container::UdpTrackerServices;

/// The process-scoped services shared by every front-end instance.
///
/// Ownership is a straight line: peers live by value inside swarms, swarms
/// inside registry shards, the registry inside this container. There are no
/// back-pointers and no global registries; tests wire their own instances.
pub struct AppContainer {
    pub configuration: Arc<Configuration>,
    pub swarm_registry: Arc<Registry>,
    pub in_memory_whitelist: Arc<InMemoryWhitelist>,
    pub whitelist_authorization: Arc<WhitelistAuthorization>,
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
    pub stats_repository: Arc<statistics::repository::Repository>,
}

impl AppContainer {
    #[must_use]
    pub fn initialize(configuration: &Configuration) -> AppContainer {
        let core_config = &configuration.core;

        let swarm_registry = Arc::new(Registry::new(core_config.shard_count));
        let in_memory_whitelist = Arc::new(InMemoryWhitelist::default());
        let whitelist_authorization = Arc::new(WhitelistAuthorization::new(core_config, &in_memory_whitelist));
        let announce_handler = Arc::new(AnnounceHandler::new(core_config, &swarm_registry));
        let scrape_handler = Arc::new(ScrapeHandler::new(&whitelist_authorization, &swarm_registry));
        let stats_repository = Arc::new(statistics::repository::Repository::default());

        AppContainer {
            configuration: Arc::new(configuration.clone()),
            swarm_registry,
            in_memory_whitelist,
            whitelist_authorization,
            announce_handler,
            scrape_handler,
            stats_repository,
        }
    }

    /// The service set one HTTP tracker instance needs.
    #[must_use]
    pub fn http_tracker_services(&self) -> Arc<HttpTrackerServices> {
        Arc::new(HttpTrackerServices {
            core_config: Arc::new(self.configuration.core.clone()),
            announce_handler: self.announce_handler.clone(),
            scrape_handler: self.scrape_handler.clone(),
            whitelist_authorization: self.whitelist_authorization.clone(),
            stats_repository: self.stats_repository.clone(),
        })
    }

    /// The service set one UDP tracker instance needs. Every instance gets
    /// its own connection cookie (and therefore its own IV rotation).
    #[must_use]
    pub fn udp_tracker_services(&self, connection_cookie: Arc<ConnectionCookie>) -> Arc<UdpTrackerServices> {
        Arc::new(UdpTrackerServices {
            core_config: Arc::new(self.configuration.core.clone()),
            announce_handler: self.announce_handler.clone(),
            scrape_handler: self.scrape_handler.clone(),
            whitelist_authorization: self.whitelist_authorization.clone(),
            stats_repository: self.stats_repository.clone(),
            connection_cookie,
        })
    }
}
