//! Builds the canonical peer from a UDP announce request.
use std::net::{IpAddr, SocketAddr};

use peerhub_primitives::peer::Peer;
use peerhub_primitives::DurationSinceUnixEpoch;
use peerhub_udp_protocol::request::AnnounceRequest;

/// The peer as the swarm registry will store it.
///
/// The IP comes from the datagram's source address; the 32-bit IP field of
/// the announce request is only honored when the tracker allows IP spoofing.
/// The port always comes from the request (the port the client listens on,
/// not the ephemeral source port of the datagram).
#[must_use]
pub fn from_request(request: &AnnounceRequest, remote_ip: &IpAddr, allow_ip_spoofing: bool) -> Peer {
    let peer_ip = match (allow_ip_spoofing, request.ip_address) {
        (true, Some(declared_ip)) => IpAddr::V4(declared_ip),
        _ => *remote_ip,
    };

    Peer {
        peer_id: request.peer_id,
        peer_addr: SocketAddr::new(peer_ip, request.port),
        updated: DurationSinceUnixEpoch::default(),
        uploaded: request.bytes_uploaded,
        downloaded: request.bytes_downloaded,
        left: request.bytes_left,
        event: request.event,
    }
}
