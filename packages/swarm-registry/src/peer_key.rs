//! The key peers are stored under inside a swarm.
use std::net::IpAddr;

use peerhub_primitives::peer::Peer;

/// Map key for a peer inside one swarm: the peer id, the port (big endian)
/// and the IP bytes, concatenated.
///
/// Keying on the full triple gives endpoint-level uniqueness (a client
/// re-announcing from a new port is a new entry) and makes removals a single
/// map operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerKey(Box<[u8]>);

impl From<&Peer> for PeerKey {
    fn from(peer: &Peer) -> Self {
        let mut bytes = Vec::with_capacity(20 + 2 + 16);

        bytes.extend_from_slice(&peer.peer_id.0);
        bytes.extend_from_slice(&peer.port().to_be_bytes());

        match peer.ip() {
            IpAddr::V4(ip) => bytes.extend_from_slice(&ip.octets()),
            IpAddr::V6(ip) => bytes.extend_from_slice(&ip.octets()),
        }

        PeerKey(bytes.into_boxed_slice())
    }
}
