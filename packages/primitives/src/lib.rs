//! Primitive types shared by the tracker crates.
//!
//! This crate contains the domain types that the swarm registry, the protocol
//! crates and the servers exchange: infohashes, peer identifiers, peers,
//! announce events and swarm statistics.
pub mod announce_event;
pub mod core;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;

use std::time::Duration;

/// Duration since the Unix Epoch (timestamp).
pub type DurationSinceUnixEpoch = Duration;

/// The address family of a peer, derived from its IP address.
///
/// The swarm registry keeps IPv4 and IPv6 entries in disjoint shards, so most
/// registry operations are scoped to one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}

impl From<std::net::IpAddr> for AddressFamily {
    fn from(ip: std::net::IpAddr) -> Self {
        match ip {
            std::net::IpAddr::V4(_) => AddressFamily::V4,
            std::net::IpAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl From<&std::net::SocketAddr> for AddressFamily {
    fn from(addr: &std::net::SocketAddr) -> Self {
        addr.ip().into()
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "ipv4"),
            AddressFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// Number of bytes reported by a peer (uploaded, downloaded or left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct NumberOfBytes(pub u64);

impl NumberOfBytes {
    #[must_use]
    pub fn new(bytes: u64) -> Self {
        Self(bytes)
    }
}
