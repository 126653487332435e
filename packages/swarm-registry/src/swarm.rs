//! A swarm is the set of peers interested in one torrent, split into seeders
//! and leechers.
use std::collections::HashMap;
use std::net::SocketAddr;

use peerhub_primitives::peer::Peer;
use peerhub_primitives::swarm_metadata::SwarmMetadata;
use peerhub_primitives::DurationSinceUnixEpoch;
use rand::Rng;

use crate::peer_key::PeerKey;

/// Per-infohash state for one address family.
///
/// A peer key is never present in both sets: the mutating operations take
/// care of removing it from the opposite role before inserting.
#[derive(Debug, Clone, Default)]
pub struct Swarm {
    seeders: HashMap<PeerKey, Peer>,
    leechers: HashMap<PeerKey, Peer>,
}

impl Swarm {
    /// Upserts the peer into the seeder set.
    pub fn upsert_seeder(&mut self, peer: &Peer) {
        let key = PeerKey::from(peer);

        self.leechers.remove(&key);
        self.seeders.insert(key, *peer);
    }

    /// Upserts the peer into the leecher set.
    pub fn upsert_leecher(&mut self, peer: &Peer) {
        let key = PeerKey::from(peer);

        self.seeders.remove(&key);
        self.leechers.insert(key, *peer);
    }

    /// Moves the peer from the leecher set (if present) into the seeder set,
    /// refreshing its entry.
    pub fn graduate_leecher(&mut self, peer: &Peer) {
        let key = PeerKey::from(peer);

        self.leechers.remove(&key);
        self.seeders.insert(key, *peer);
    }

    pub fn remove_seeder(&mut self, peer: &Peer) -> Option<Peer> {
        self.seeders.remove(&PeerKey::from(peer))
    }

    pub fn remove_leecher(&mut self, peer: &Peer) -> Option<Peer> {
        self.leechers.remove(&PeerKey::from(peer))
    }

    /// Selects up to `limit` peers to return to the requester at
    /// `exclude_addr`.
    ///
    /// A seeder has no interest in other seeders, so it only gets leechers.
    /// Everyone else gets seeders preferentially and leechers as filler. The
    /// entry listening on the requester's own endpoint is never included.
    ///
    /// Each role set is walked from a random starting offset so a popular
    /// swarm does not perpetually advertise the same page of peers.
    #[must_use]
    pub fn select_peers(&self, requester_is_seeder: bool, exclude_addr: &SocketAddr, limit: usize) -> Vec<Peer> {
        let mut selected = Vec::new();

        if limit == 0 {
            return selected;
        }

        if requester_is_seeder {
            take_from_random_offset(&self.leechers, exclude_addr, limit, &mut selected);
        } else {
            take_from_random_offset(&self.seeders, exclude_addr, limit, &mut selected);
            take_from_random_offset(&self.leechers, exclude_addr, limit, &mut selected);
        }

        selected
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn metadata(&self) -> SwarmMetadata {
        SwarmMetadata {
            downloaded: 0,
            complete: self.seeders.len() as u32,
            incomplete: self.leechers.len() as u32,
        }
    }

    /// Removes every entry whose last observation is at or before the cutoff.
    /// Returns the number of removed entries.
    pub fn remove_expired(&mut self, current_cutoff: DurationSinceUnixEpoch) -> usize {
        let len_before = self.len();

        self.seeders.retain(|_, peer| peer.updated > current_cutoff);
        self.leechers.retain(|_, peer| peer.updated > current_cutoff);

        len_before - self.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seeders.len() + self.leechers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty() && self.leechers.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains_seeder(&self, peer: &Peer) -> bool {
        self.seeders.contains_key(&PeerKey::from(peer))
    }

    #[cfg(test)]
    pub(crate) fn contains_leecher(&self, peer: &Peer) -> bool {
        self.leechers.contains_key(&PeerKey::from(peer))
    }
}

fn take_from_random_offset(peers: &HashMap<PeerKey, Peer>, exclude_addr: &SocketAddr, limit: usize, out: &mut Vec<Peer>) {
    if out.len() >= limit {
        return;
    }

    let candidates: Vec<&Peer> = peers.values().filter(|peer| !peer.shares_endpoint_with(exclude_addr)).collect();

    if candidates.is_empty() {
        return;
    }

    let offset = rand::thread_rng().gen_range(0..candidates.len());

    for peer in candidates.iter().cycle().skip(offset).take(candidates.len()) {
        if out.len() >= limit {
            break;
        }
        out.push(**peer);
    }
}
