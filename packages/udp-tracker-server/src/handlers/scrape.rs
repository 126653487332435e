//! UDP tracker scrape handler.
use std::net::SocketAddr;
use std::sync::Arc;

use peerhub_primitives::core::ScrapeData;
use peerhub_tracker_core::statistics::Protocol;
use peerhub_udp_protocol::request::ScrapeRequest;
use peerhub_udp_protocol::response::{Response, ScrapeResponse, TorrentScrapeStatistics};
use peerhub_udp_protocol::{NumberOfDownloads, NumberOfPeers, TransactionId};

use crate::container::UdpTrackerServices;
use crate::error::Error;

/// Handles a `scrape` request.
///
/// Unknown infohashes scrape as all-zero entries rather than an error, the
/// same behavior the HTTP tracker has.
///
/// # Errors
///
/// Returns the pipeline error together with the transaction ID to echo.
pub async fn handle_scrape(
    client_socket_addr: SocketAddr,
    request: &ScrapeRequest,
    services: &Arc<UdpTrackerServices>,
) -> Result<Response, (Error, TransactionId)> {
    let transaction_id = request.transaction_id;

    services
        .connection_cookie
        .check(&request.connection_id, &client_socket_addr.ip())
        .map_err(|err| (Error::from(err), transaction_id))?;

    let scrape_data = services
        .scrape_handler
        .scrape(&request.info_hashes, client_socket_addr.ip().into())
        .await;

    services
        .stats_repository
        .record_scrape(Protocol::Udp, client_socket_addr.ip().into());

    Ok(build_response(transaction_id, &scrape_data))
}

fn build_response(transaction_id: TransactionId, scrape_data: &ScrapeData) -> Response {
    #[allow(clippy::cast_possible_wrap)]
    let torrent_stats = scrape_data
        .files
        .iter()
        .map(|entry| TorrentScrapeStatistics {
            seeders: NumberOfPeers(entry.stats.complete as i32),
            completed: NumberOfDownloads(entry.stats.downloaded as i32),
            leechers: NumberOfPeers(entry.stats.incomplete as i32),
        })
        .collect();

    Response::from(ScrapeResponse {
        transaction_id,
        torrent_stats,
    })
}

#[cfg(test)]
mod tests {

    mod the_scrape_handler {

        use peerhub_udp_protocol::request::ScrapeRequest;
        use peerhub_udp_protocol::response::Response;
        use peerhub_udp_protocol::{ConnectionId, NumberOfDownloads, NumberOfPeers, TransactionId};

        use crate::handlers::scrape::handle_scrape;
        use crate::tests::{initialize_public_services, sample_info_hash, sample_ipv4_remote_addr, TestEnvironment};

        fn scrape_request_for(env: &TestEnvironment) -> ScrapeRequest {
            ScrapeRequest {
                connection_id: env.services.connection_cookie.generate(&sample_ipv4_remote_addr().ip()),
                transaction_id: TransactionId(0x0102_0304),
                info_hashes: vec![sample_info_hash()],
            }
        }

        #[tokio::test]
        async fn a_scrape_for_an_unknown_torrent_should_return_one_all_zero_entry() {
            let env = initialize_public_services();

            let response = handle_scrape(sample_ipv4_remote_addr(), &scrape_request_for(&env), &env.services)
                .await
                .unwrap();

            match response {
                Response::Scrape(scrape_response) => {
                    assert_eq!(scrape_response.transaction_id, TransactionId(0x0102_0304));
                    assert_eq!(scrape_response.torrent_stats.len(), 1);
                    assert_eq!(scrape_response.torrent_stats[0].seeders, NumberOfPeers(0));
                    assert_eq!(scrape_response.torrent_stats[0].completed, NumberOfDownloads(0));
                    assert_eq!(scrape_response.torrent_stats[0].leechers, NumberOfPeers(0));
                }
                other => panic!("expected a scrape response, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn a_scrape_should_report_the_swarm_counts_for_the_client_address_family() {
            let env = initialize_public_services();

            let seeder = peerhub_primitives::peer::fixture::PeerBuilder::seeder()
                .with_peer_addr(&"126.0.0.2:6881".parse().unwrap())
                .build();
            let leecher = peerhub_primitives::peer::fixture::PeerBuilder::leecher()
                .with_peer_addr(&"126.0.0.3:6881".parse().unwrap())
                .build();

            env.swarm_registry.upsert_seeder(&sample_info_hash(), &seeder);
            env.swarm_registry.upsert_leecher(&sample_info_hash(), &leecher);

            let response = handle_scrape(sample_ipv4_remote_addr(), &scrape_request_for(&env), &env.services)
                .await
                .unwrap();

            match response {
                Response::Scrape(scrape_response) => {
                    assert_eq!(scrape_response.torrent_stats[0].seeders, NumberOfPeers(1));
                    assert_eq!(scrape_response.torrent_stats[0].leechers, NumberOfPeers(1));
                }
                other => panic!("expected a scrape response, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn a_scrape_with_an_invalid_connection_id_should_be_rejected() {
            let env = initialize_public_services();

            let request = ScrapeRequest {
                connection_id: ConnectionId(0x1234_5678),
                transaction_id: TransactionId(0x0102_0304),
                info_hashes: vec![sample_info_hash()],
            };

            let (error, transaction_id) = handle_scrape(sample_ipv4_remote_addr(), &request, &env.services)
                .await
                .unwrap_err();

            assert_eq!(error.client_message(), "bad connection ID");
            assert_eq!(transaction_id, TransactionId(0x0102_0304));
        }
    }
}
