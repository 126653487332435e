//! UDP tracker announce handler.
use std::net::SocketAddr;
use std::sync::Arc;

use peerhub_configuration::Core;
use peerhub_primitives::core::AnnounceData;
use peerhub_tracker_core::announce_handler::PeersWanted;
use peerhub_tracker_core::statistics::Protocol;
use peerhub_udp_protocol::request::AnnounceRequest;
use peerhub_udp_protocol::response::{AnnounceResponse, Response, ResponsePeer};
use peerhub_udp_protocol::{NumberOfPeers, TransactionId};

use crate::container::UdpTrackerServices;
use crate::error::Error;
use crate::peer_builder;

/// Handles an `announce` request.
///
/// The client must present a connection-ID cookie minted for its source
/// address; announces for non-whitelisted torrents are rejected in listed
/// mode.
///
/// # Errors
///
/// Returns the pipeline error together with the transaction ID to echo.
pub async fn handle_announce(
    client_socket_addr: SocketAddr,
    request: &AnnounceRequest,
    services: &Arc<UdpTrackerServices>,
) -> Result<Response, (Error, TransactionId)> {
    let transaction_id = request.transaction_id;

    services
        .connection_cookie
        .check(&request.connection_id, &client_socket_addr.ip())
        .map_err(|err| (Error::from(err), transaction_id))?;

    services
        .whitelist_authorization
        .authorize(&request.info_hash)
        .await
        .map_err(|err| (Error::from(err), transaction_id))?;

    let remote_ip = client_socket_addr.ip();

    let mut peer = peer_builder::from_request(request, &remote_ip, services.core_config.net.allow_ip_spoofing);

    let peers_wanted: PeersWanted = request.peers_wanted.0.into();

    let announce_data = services
        .announce_handler
        .announce(&request.info_hash, &mut peer, &remote_ip, &peers_wanted);

    services.stats_repository.record_announce(Protocol::Udp, remote_ip.into());

    Ok(build_response(client_socket_addr, transaction_id, &services.core_config, &announce_data))
}

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
fn build_response(
    client_socket_addr: SocketAddr,
    transaction_id: TransactionId,
    core_config: &Arc<Core>,
    announce_data: &AnnounceData,
) -> Response {
    let peers = if client_socket_addr.is_ipv4() {
        &announce_data.peers_v4
    } else {
        &announce_data.peers_v6
    };

    Response::from(AnnounceResponse {
        transaction_id,
        announce_interval: core_config.announce_policy.interval as i32,
        leechers: NumberOfPeers(announce_data.stats.incomplete as i32),
        seeders: NumberOfPeers(announce_data.stats.complete as i32),
        peers: peers
            .iter()
            .map(|peer| ResponsePeer {
                ip_address: peer.ip(),
                port: peer.port(),
            })
            .collect(),
    })
}
