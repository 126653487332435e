//! Scrape handler.
//!
//! A scrape returns aggregate counts (seeders, completions, leechers) for a
//! list of torrents, without peer lists.
use std::sync::Arc;

use peerhub_primitives::core::ScrapeData;
use peerhub_primitives::info_hash::InfoHash;
use peerhub_primitives::AddressFamily;
use peerhub_swarm_registry::Registry;

use crate::whitelist::authorization::WhitelistAuthorization;

/// Handles `scrape` requests.
pub struct ScrapeHandler {
    whitelist_authorization: Arc<WhitelistAuthorization>,
    swarm_registry: Arc<Registry>,
}

impl ScrapeHandler {
    #[must_use]
    pub fn new(whitelist_authorization: &Arc<WhitelistAuthorization>, swarm_registry: &Arc<Registry>) -> Self {
        Self {
            whitelist_authorization: whitelist_authorization.clone(),
            swarm_registry: swarm_registry.clone(),
        }
    }

    /// Returns one entry per requested infohash, preserving the request
    /// order.
    ///
    /// Torrents the requester is not authorized for (listed mode) and
    /// torrents without a swarm yield zeroed entries; a scrape never fails
    /// because of an unknown infohash.
    pub async fn scrape(&self, info_hashes: &[InfoHash], family: AddressFamily) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            if self.whitelist_authorization.authorize(info_hash).await.is_ok() {
                scrape_data.add_file(info_hash, self.swarm_registry.swarm_metadata(info_hash, family));
            } else {
                scrape_data.add_file_with_no_stats(info_hash);
            }
        }

        scrape_data
    }
}

#[cfg(test)]
mod tests {

    mod the_scrape_handler {

        use peerhub_primitives::core::ScrapeData;
        use peerhub_primitives::swarm_metadata::SwarmMetadata;
        use peerhub_primitives::AddressFamily;

        use crate::tests::{initialize_public_core_services, sample_info_hash, sample_peer};

        #[tokio::test]
        async fn it_should_return_a_zeroed_entry_for_a_torrent_without_a_swarm() {
            let services = initialize_public_core_services();

            let scrape_data = services
                .scrape_handler
                .scrape(&[sample_info_hash()], AddressFamily::V4)
                .await;

            assert_eq!(scrape_data, ScrapeData::zeroed(&[sample_info_hash()]));
        }

        #[tokio::test]
        async fn it_should_return_the_swarm_counts_in_request_order() {
            let services = initialize_public_core_services();

            let seeder = sample_peer(b"-TR2820-0000000seed1", 1, 6881, 0);
            services.swarm_registry.upsert_seeder(&sample_info_hash(), &seeder);

            let unknown: peerhub_primitives::info_hash::InfoHash =
                "aaaabbbbccccddddeeeeffff00001111aaaabbbb".parse().unwrap();

            let scrape_data = services
                .scrape_handler
                .scrape(&[unknown, sample_info_hash()], AddressFamily::V4)
                .await;

            assert_eq!(scrape_data.files.len(), 2);
            assert_eq!(scrape_data.files[0].info_hash, unknown);
            assert_eq!(scrape_data.files[0].stats, SwarmMetadata::zeroed());
            assert_eq!(scrape_data.files[1].info_hash, sample_info_hash());
            assert_eq!(
                scrape_data.files[1].stats,
                SwarmMetadata {
                    downloaded: 0,
                    complete: 1,
                    incomplete: 0
                }
            );
        }

        mod in_listed_mode {

            use peerhub_configuration::Configuration;
            use peerhub_primitives::swarm_metadata::SwarmMetadata;
            use peerhub_primitives::AddressFamily;

            use crate::tests::{initialize_core_services, sample_info_hash, sample_peer};

            fn listed_configuration() -> Configuration {
                let mut config = Configuration::default();
                config.core.listed = true;
                config
            }

            #[tokio::test]
            async fn it_should_zero_the_entries_for_non_whitelisted_torrents() {
                let services = initialize_core_services(&listed_configuration());

                let seeder = sample_peer(b"-TR2820-0000000seed1", 1, 6881, 0);
                services.swarm_registry.upsert_seeder(&sample_info_hash(), &seeder);

                let scrape_data = services
                    .scrape_handler
                    .scrape(&[sample_info_hash()], AddressFamily::V4)
                    .await;

                assert_eq!(scrape_data.files[0].stats, SwarmMetadata::zeroed());
            }

            #[tokio::test]
            async fn it_should_report_the_counts_for_whitelisted_torrents() {
                let services = initialize_core_services(&listed_configuration());

                services.in_memory_whitelist.add(&sample_info_hash()).await;

                let seeder = sample_peer(b"-TR2820-0000000seed1", 1, 6881, 0);
                services.swarm_registry.upsert_seeder(&sample_info_hash(), &seeder);

                let scrape_data = services
                    .scrape_handler
                    .scrape(&[sample_info_hash()], AddressFamily::V4)
                    .await;

                assert_eq!(scrape_data.files[0].stats.complete, 1);
            }
        }
    }
}
