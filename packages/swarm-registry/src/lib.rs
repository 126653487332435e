//! Sharded in-memory swarm registry.
//!
//! The registry is the only shared mutable state of the tracker. It maps
//! infohashes to swarms (a set of seeders and a set of leechers) and is split
//! into shards, each guarded by its own reader/writer lock, so that announces
//! for unrelated torrents make progress independently.
//!
//! IPv4 and IPv6 entries live in disjoint shards: every registry operation is
//! scoped to one address family.
pub mod peer_key;
pub mod registry;
pub mod swarm;

pub use registry::{GarbageCollection, Registry};

#[cfg(test)]
pub(crate) mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use peerhub_primitives::announce_event::AnnounceEvent;
    use peerhub_primitives::info_hash::InfoHash;
    use peerhub_primitives::peer::{Peer, PeerId};
    use peerhub_primitives::{DurationSinceUnixEpoch, NumberOfBytes};

    /// # Panics
    ///
    /// Will panic if the string representation of the info hash is not a valid info hash.
    #[must_use]
    pub fn sample_info_hash() -> InfoHash {
        "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
            .parse::<InfoHash>()
            .expect("String should be a valid info hash")
    }

    /// A peer that counts as `complete` in swarm metadata.
    #[must_use]
    pub fn seeder() -> Peer {
        Peer {
            peer_id: PeerId(*b"-qB00000000000000001"),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
            updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
            uploaded: NumberOfBytes::new(0),
            downloaded: NumberOfBytes::new(0),
            left: NumberOfBytes::new(0),
            event: AnnounceEvent::Completed,
        }
    }

    /// A peer that counts as `incomplete` in swarm metadata.
    #[must_use]
    pub fn leecher() -> Peer {
        Peer {
            peer_id: PeerId(*b"-qB00000000000000002"),
            peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 8080),
            updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
            uploaded: NumberOfBytes::new(0),
            downloaded: NumberOfBytes::new(0),
            left: NumberOfBytes::new(1000),
            event: AnnounceEvent::Started,
        }
    }

    /// It generates a peer id from a number, e.g. `-qB00000000000000012` for 12.
    #[must_use]
    pub fn numeric_peer_id(two_digits_value: u8) -> PeerId {
        let idx_str = format!("{two_digits_value:02}");

        let mut peer_id_bytes = *b"-qB00000000000000000";
        peer_id_bytes[20 - idx_str.len()..].copy_from_slice(idx_str.as_bytes());

        PeerId(peer_id_bytes)
    }
}
