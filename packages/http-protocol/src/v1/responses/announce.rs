//! `Announce` response bodies.
//!
//! Two renderings of the same [`AnnounceData`]: a list of peer dictionaries
//! (BEP 3) or binary packed peer strings (BEP 23 for IPv4, BEP 7 `peers6`
//! for IPv6). The client picks with the `compact` param.
use std::net::IpAddr;

use peerhub_primitives::core::AnnounceData;
use peerhub_primitives::peer;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

/// Normal (non compact) `announce` response: the peer list is a list of
/// dictionaries.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr};
///
/// use peerhub_http_protocol::v1::responses::announce::{NonCompact, Peer};
///
/// let response = NonCompact {
///     complete: 333,
///     incomplete: 444,
///     interval: 111,
///     interval_min: 222,
///     peers: vec![Peer {
///         ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)).to_string(),
///         peer_id: serde_bytes::ByteBuf::from(*b"-qB00000000000000001"),
///         port: 0x7070,
///     }],
/// };
///
/// let expected = b"d8:completei333e10:incompletei444e8:intervali111e12:min intervali222e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eeee";
///
/// assert_eq!(response.body().unwrap(), expected.to_vec());
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NonCompact {
    /// Number of peers with the entire file, i.e. seeders.
    pub complete: u32,

    /// Number of non-seeder peers, aka "leechers".
    pub incomplete: u32,

    /// Recommended seconds between announces.
    pub interval: u32,

    /// Clients must not announce more frequently than this.
    #[serde(rename = "min interval")]
    pub interval_min: u32,

    /// The peer list as dictionaries.
    pub peers: Vec<Peer>,
}

/// Peer dictionary in the [`NonCompact`] response.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Peer {
    /// The peer's IP address, rendered as text.
    pub ip: String,

    /// The peer's ID, 20 raw bytes.
    #[serde(rename = "peer id")]
    pub peer_id: ByteBuf,

    /// The peer's port number.
    pub port: u16,
}

impl From<peer::Peer> for Peer {
    fn from(peer: peer::Peer) -> Self {
        Peer {
            ip: peer.ip().to_string(),
            peer_id: ByteBuf::from(peer.peer_id.0),
            port: peer.port(),
        }
    }
}

impl NonCompact {
    /// Returns the bencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be bencoded.
    pub fn body(&self) -> Result<Vec<u8>, serde_bencode::Error> {
        serde_bencode::to_bytes(self)
    }
}

impl From<&AnnounceData> for NonCompact {
    fn from(data: &AnnounceData) -> Self {
        let peers = data
            .peers_v4
            .iter()
            .chain(data.peers_v6.iter())
            .map(|peer| Peer::from(*peer))
            .collect();

        Self {
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            interval: data.policy.interval,
            interval_min: data.policy.interval_min,
            peers,
        }
    }
}

/// Compact `announce` response: binary packed peers, 6 bytes per IPv4 peer
/// under `peers` and 18 bytes per IPv6 peer under `peers6`.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr};
///
/// use peerhub_http_protocol::v1::responses::announce::Compact;
///
/// let response = Compact {
///     complete: 333,
///     incomplete: 444,
///     interval: 111,
///     interval_min: 222,
///     peers: serde_bytes::ByteBuf::from(*b"iiiipp"),
///     peers6: serde_bytes::ByteBuf::from(*b"iiiiiiiiiiiiiiiipp"),
/// };
///
/// let expected = b"d8:completei333e10:incompletei444e8:intervali111e12:min intervali222e5:peers6:iiiipp6:peers618:iiiiiiiiiiiiiiiippe";
///
/// assert_eq!(response.body().unwrap(), expected.to_vec());
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Compact {
    /// Number of peers with the entire file, i.e. seeders.
    pub complete: u32,

    /// Number of non-seeder peers, aka "leechers".
    pub incomplete: u32,

    /// Recommended seconds between announces.
    pub interval: u32,

    /// Clients must not announce more frequently than this.
    #[serde(rename = "min interval")]
    pub interval_min: u32,

    /// IPv4 peers: 4 bytes address + 2 bytes port, big endian, concatenated.
    pub peers: ByteBuf,

    /// IPv6 peers: 16 bytes address + 2 bytes port, big endian, concatenated.
    pub peers6: ByteBuf,
}

impl Compact {
    /// Returns the bencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be bencoded.
    pub fn body(&self) -> Result<Vec<u8>, serde_bencode::Error> {
        serde_bencode::to_bytes(self)
    }
}

impl From<&AnnounceData> for Compact {
    fn from(data: &AnnounceData) -> Self {
        let mut peers = Vec::with_capacity(data.peers_v4.len() * 6);
        for peer in &data.peers_v4 {
            if let IpAddr::V4(ip) = peer.ip() {
                peers.extend_from_slice(&ip.octets());
                peers.extend_from_slice(&peer.port().to_be_bytes());
            }
        }

        let mut peers6 = Vec::with_capacity(data.peers_v6.len() * 18);
        for peer in &data.peers_v6 {
            if let IpAddr::V6(ip) = peer.ip() {
                peers6.extend_from_slice(&ip.octets());
                peers6.extend_from_slice(&peer.port().to_be_bytes());
            }
        }

        Self {
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            interval: data.policy.interval,
            interval_min: data.policy.interval_min,
            peers: ByteBuf::from(peers),
            peers6: ByteBuf::from(peers6),
        }
    }
}
