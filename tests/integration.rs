//! End-to-end tests driving a whole tracker instance over real sockets.
use std::net::SocketAddr;
use std::time::Duration;

use peerhub_configuration::Configuration;
use peerhub_lib::app;
use peerhub_lib::bootstrap::jobs::JobManager;
use peerhub_lib::container::AppContainer;
use peerhub_primitives::info_hash::InfoHash;
use peerhub_udp_protocol::request::{AnnounceRequest, ConnectRequest, Request};
use peerhub_udp_protocol::response::Response;
use peerhub_udp_protocol::{ConnectionId, NumberOfPeers, PeerKey, TransactionId};

fn ephemeral_configuration() -> Configuration {
    let mut config = Configuration::default();

    config.http_trackers[0].bind_address = "127.0.0.1:0".parse().unwrap();
    config.udp_trackers[0].bind_address = "127.0.0.1:0".parse().unwrap();

    config
}

async fn start_tracker() -> (AppContainer, JobManager) {
    let configuration = ephemeral_configuration();

    let app_container = AppContainer::initialize(&configuration);

    let jobs = app::start(&configuration, &app_container).await;

    (app_container, jobs)
}

async fn stop_tracker(mut jobs: JobManager) {
    jobs.cancel();
    jobs.wait_for_all(Duration::from_secs(10)).await;
}

fn sample_info_hash() -> InfoHash {
    "89d4bc521116ca1d42a2f30d1f274d94e4681daf".parse().unwrap()
}

fn encoded_info_hash() -> String {
    percent_encoding::percent_encode(&sample_info_hash().0, percent_encoding::NON_ALPHANUMERIC).to_string()
}

fn announce_url(binding: &SocketAddr, peer_suffix: char, port: u16, left: u64, extra: &str) -> String {
    format!(
        "http://{binding}/announce?info_hash={}&peer_id=-TR2820-00000000000{peer_suffix}&port={port}&uploaded=0&downloaded=0&left={left}{extra}",
        encoded_info_hash(),
    )
}

#[tokio::test]
async fn three_peers_should_progress_through_a_public_swarm_over_http() {
    let (_app_container, jobs) = start_tracker().await;

    let http_binding = jobs.http_bindings()[0];

    // Two seeders announce: each is alone from its own point of view.
    let body = reqwest::get(announce_url(&http_binding, '1', 6881, 0, "&compact=1"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).into_owned();
    assert!(text.starts_with("d8:completei1e10:incompletei0e"), "got: {text}");
    assert!(text.contains("5:peers0:"), "got: {text}");

    let body = reqwest::get(announce_url(&http_binding, '2', 6882, 0, "&compact=1"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).into_owned();
    assert!(text.starts_with("d8:completei2e10:incompletei0e"), "got: {text}");
    assert!(text.contains("5:peers0:"), "got: {text}");

    // A leecher announces and receives both seeders (2 compact records =
    // 12 bytes).
    let body = reqwest::get(announce_url(&http_binding, '3', 6883, 1, "&compact=1"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).into_owned();
    assert!(text.starts_with("d8:completei2e10:incompletei1e"), "got: {text}");
    assert!(text.contains("5:peers12:"), "got: {text}");

    // The first seeder stops: a valid response with empty peer lists.
    let body = reqwest::get(announce_url(&http_binding, '1', 6881, 0, "&compact=1&event=stopped"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).into_owned();
    assert!(text.starts_with("d8:completei1e10:incompletei1e"), "got: {text}");
    assert!(text.contains("5:peers0:"), "got: {text}");

    // The leecher now only gets the remaining seeder.
    let body = reqwest::get(announce_url(&http_binding, '3', 6883, 1, "&compact=1"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body).into_owned();
    assert!(text.starts_with("d8:completei1e10:incompletei1e"), "got: {text}");
    assert!(text.contains("5:peers6:"), "got: {text}");

    stop_tracker(jobs).await;
}

#[tokio::test]
async fn the_udp_handshake_should_gate_announces_on_a_valid_connection_id() {
    let (_app_container, jobs) = start_tracker().await;

    let udp_binding = jobs.udp_bindings()[0];

    let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(udp_binding).await.unwrap();

    // Connect handshake.
    let mut packet = Vec::new();
    Request::from(ConnectRequest {
        transaction_id: TransactionId(0x0102_0304),
    })
    .write_bytes(&mut packet)
    .unwrap();
    client.send(&packet).await.unwrap();

    let mut buffer = [0u8; 2048];
    let len = client.recv(&mut buffer).await.unwrap();

    let connection_id = match Response::parse_bytes(&buffer[..len], true).unwrap() {
        Response::Connect(connect_response) => {
            assert_eq!(connect_response.transaction_id, TransactionId(0x0102_0304));
            connect_response.connection_id
        }
        other => panic!("expected a connect response, got {other:?}"),
    };

    // An announce with a bogus connection ID is rejected.
    let bogus_announce = AnnounceRequest {
        connection_id: ConnectionId(connection_id.0 ^ 0x55),
        transaction_id: TransactionId(0x0102_0304),
        info_hash: sample_info_hash(),
        peer_id: peerhub_primitives::peer::PeerId(*b"-TR2820-000000000001"),
        bytes_downloaded: peerhub_primitives::NumberOfBytes(0),
        bytes_left: peerhub_primitives::NumberOfBytes(0),
        bytes_uploaded: peerhub_primitives::NumberOfBytes(0),
        event: peerhub_primitives::announce_event::AnnounceEvent::Started,
        ip_address: None,
        key: PeerKey(0),
        peers_wanted: NumberOfPeers(50),
        port: 6881,
    };

    let mut packet = Vec::new();
    Request::from(bogus_announce.clone()).write_bytes(&mut packet).unwrap();
    client.send(&packet).await.unwrap();

    let len = client.recv(&mut buffer).await.unwrap();

    match Response::parse_bytes(&buffer[..len], true).unwrap() {
        Response::Error(error_response) => {
            assert_eq!(error_response.transaction_id, TransactionId(0x0102_0304));
            assert_eq!(error_response.message, "bad connection ID");
        }
        other => panic!("expected an error response, got {other:?}"),
    }

    // The same announce with the minted connection ID is served.
    let announce = AnnounceRequest {
        connection_id,
        ..bogus_announce
    };

    let mut packet = Vec::new();
    Request::from(announce).write_bytes(&mut packet).unwrap();
    client.send(&packet).await.unwrap();

    let len = client.recv(&mut buffer).await.unwrap();

    match Response::parse_bytes(&buffer[..len], true).unwrap() {
        Response::Announce(announce_response) => {
            assert_eq!(announce_response.seeders, NumberOfPeers(1));
            assert_eq!(announce_response.leechers, NumberOfPeers(0));
            assert!(announce_response.peers.is_empty());
        }
        other => panic!("expected an announce response, got {other:?}"),
    }

    stop_tracker(jobs).await;
}

#[tokio::test]
async fn a_udp_scrape_for_an_unknown_torrent_should_return_one_zeroed_entry() {
    let (_app_container, jobs) = start_tracker().await;

    let udp_binding = jobs.udp_bindings()[0];

    let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(udp_binding).await.unwrap();

    let mut packet = Vec::new();
    Request::from(ConnectRequest {
        transaction_id: TransactionId(1),
    })
    .write_bytes(&mut packet)
    .unwrap();
    client.send(&packet).await.unwrap();

    let mut buffer = [0u8; 2048];
    let len = client.recv(&mut buffer).await.unwrap();

    let connection_id = match Response::parse_bytes(&buffer[..len], true).unwrap() {
        Response::Connect(connect_response) => connect_response.connection_id,
        other => panic!("expected a connect response, got {other:?}"),
    };

    let mut packet = Vec::new();
    Request::from(peerhub_udp_protocol::request::ScrapeRequest {
        connection_id,
        transaction_id: TransactionId(2),
        info_hashes: vec![sample_info_hash()],
    })
    .write_bytes(&mut packet)
    .unwrap();
    client.send(&packet).await.unwrap();

    let len = client.recv(&mut buffer).await.unwrap();

    match Response::parse_bytes(&buffer[..len], true).unwrap() {
        Response::Scrape(scrape_response) => {
            assert_eq!(scrape_response.transaction_id, TransactionId(2));
            assert_eq!(scrape_response.torrent_stats.len(), 1);
            assert_eq!(scrape_response.torrent_stats[0].seeders, NumberOfPeers(0));
            assert_eq!(scrape_response.torrent_stats[0].leechers, NumberOfPeers(0));
        }
        other => panic!("expected a scrape response, got {other:?}"),
    }

    stop_tracker(jobs).await;
}
