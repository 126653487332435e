//! HTTP tracker front-end.
//!
//! An axum application serving `/announce`, `/scrape` and `/health_check`,
//! plus the `/announce/{key}` and `/scrape/{key}` aliases used in private
//! mode. Client errors are answered with a bencoded `failure reason` body
//! and HTTP status 200, which is what `BitTorrent` clients expect.
pub mod container;
pub mod routes;
pub mod server;
pub mod signals;
pub mod v1;

pub const HTTP_TRACKER_LOG_TARGET: &str = "HTTP TRACKER";

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use peerhub_configuration::Configuration;
    use peerhub_primitives::info_hash::InfoHash;
    use peerhub_swarm_registry::Registry;
    use peerhub_tracker_core::announce_handler::AnnounceHandler;
    use peerhub_tracker_core::scrape_handler::ScrapeHandler;
    use peerhub_tracker_core::statistics;
    use peerhub_tracker_core::whitelist::authorization::WhitelistAuthorization;
    use peerhub_tracker_core::whitelist::repository::InMemoryWhitelist;

    use crate::container::HttpTrackerServices;

    /// # Panics
    ///
    /// Will panic if the string representation of the info hash is not a valid info hash.
    #[must_use]
    pub fn sample_info_hash() -> InfoHash {
        "89d4bc521116ca1d42a2f30d1f274d94e4681daf"
            .parse::<InfoHash>()
            .expect("String should be a valid info hash")
    }

    /// The sample infohash, percent-encoded for a query string.
    #[must_use]
    pub fn sample_info_hash_encoded() -> String {
        percent_encoding::percent_encode(&sample_info_hash().0, percent_encoding::NON_ALPHANUMERIC).to_string()
    }

    pub struct TestEnvironment {
        pub services: Arc<HttpTrackerServices>,
        pub swarm_registry: Arc<Registry>,
        pub in_memory_whitelist: Arc<InMemoryWhitelist>,
    }

    #[must_use]
    pub fn initialize_services(config: &Configuration) -> TestEnvironment {
        let core_config = Arc::new(config.core.clone());

        let swarm_registry = Arc::new(Registry::new(core_config.shard_count));
        let in_memory_whitelist = Arc::new(InMemoryWhitelist::default());
        let whitelist_authorization = Arc::new(WhitelistAuthorization::new(&core_config, &in_memory_whitelist));
        let announce_handler = Arc::new(AnnounceHandler::new(&core_config, &swarm_registry));
        let scrape_handler = Arc::new(ScrapeHandler::new(&whitelist_authorization, &swarm_registry));
        let stats_repository = Arc::new(statistics::repository::Repository::default());

        let services = Arc::new(HttpTrackerServices {
            core_config,
            announce_handler,
            scrape_handler,
            whitelist_authorization,
            stats_repository,
        });

        TestEnvironment {
            services,
            swarm_registry,
            in_memory_whitelist,
        }
    }

    #[must_use]
    pub fn initialize_public_services() -> TestEnvironment {
        initialize_services(&Configuration::default())
    }
}
