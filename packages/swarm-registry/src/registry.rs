//! The sharded swarm registry.
use std::collections::HashMap;
use std::sync::RwLock;

use peerhub_primitives::core::ScrapeData;
use peerhub_primitives::info_hash::InfoHash;
use peerhub_primitives::peer::Peer;
use peerhub_primitives::swarm_metadata::SwarmMetadata;
use peerhub_primitives::{AddressFamily, DurationSinceUnixEpoch};

use crate::swarm::Swarm;

/// Registry storage errors. Only removals can fail; every other operation is
/// an idempotent upsert.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("torrent does not exist")]
    TorrentNotFound,

    #[error("peer not found in swarm")]
    PeerNotFound,
}

/// Counters returned by a garbage collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GarbageCollection {
    pub peers_removed: usize,
    pub swarms_removed: usize,
}

type ShardMap = HashMap<InfoHash, Swarm>;

/// Sharded mapping from infohash to swarm.
///
/// There are `2 * shard_count` shards: the shard pair for an infohash is
/// derived from its leading bytes, and the address family picks the half, so
/// IPv4 and IPv6 entries never contend on the same lock.
///
/// Locks are only held for the duration of one map operation and never across
/// an await point. Cross-shard operations do not exist; the garbage collector
/// visits shards one at a time and yields in between.
pub struct Registry {
    shards: Box<[RwLock<ShardMap>]>,
    shard_pairs: usize,
}

impl Registry {
    /// Creates a registry with `shard_count` shard pairs.
    ///
    /// # Panics
    ///
    /// Panics if `shard_count` is zero. The configuration loader rejects such
    /// a value before the registry is built.
    #[must_use]
    pub fn new(shard_count: u8) -> Self {
        assert!(shard_count > 0, "shard count must be non-zero");

        let shard_pairs = usize::from(shard_count);

        let shards = (0..shard_pairs * 2).map(|_| RwLock::new(ShardMap::new())).collect();

        Self { shards, shard_pairs }
    }

    /// Upserts the peer as a seeder, creating the swarm if needed.
    pub fn upsert_seeder(&self, info_hash: &InfoHash, peer: &Peer) {
        let mut swarms = self.write_shard(info_hash, peer.address_family());

        swarms.entry(*info_hash).or_default().upsert_seeder(peer);
    }

    /// Upserts the peer as a leecher, creating the swarm if needed.
    pub fn upsert_leecher(&self, info_hash: &InfoHash, peer: &Peer) {
        let mut swarms = self.write_shard(info_hash, peer.address_family());

        swarms.entry(*info_hash).or_default().upsert_leecher(peer);
    }

    /// Atomically moves the peer from the leecher set to the seeder set,
    /// creating the swarm if needed. A concurrent reader can never observe
    /// the peer in both sets: the transition happens under the shard's write
    /// lock.
    pub fn graduate_leecher(&self, info_hash: &InfoHash, peer: &Peer) {
        let mut swarms = self.write_shard(info_hash, peer.address_family());

        swarms.entry(*info_hash).or_default().graduate_leecher(peer);
    }

    /// Removes the peer from the seeder set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] when there is no swarm for the
    /// infohash and [`Error::PeerNotFound`] when the swarm holds no such
    /// entry. A swarm emptied by the removal is deleted in the same critical
    /// section.
    pub fn remove_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        self.remove(info_hash, peer, Swarm::remove_seeder)
    }

    /// Removes the peer from the leecher set.
    ///
    /// # Errors
    ///
    /// Same contract as [`Registry::remove_seeder`].
    pub fn remove_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        self.remove(info_hash, peer, Swarm::remove_leecher)
    }

    fn remove(
        &self,
        info_hash: &InfoHash,
        peer: &Peer,
        remove_op: fn(&mut Swarm, &Peer) -> Option<Peer>,
    ) -> Result<(), Error> {
        let mut swarms = self.write_shard(info_hash, peer.address_family());

        let swarm = swarms.get_mut(info_hash).ok_or(Error::TorrentNotFound)?;

        let removed = remove_op(swarm, peer);

        if swarm.is_empty() {
            swarms.remove(info_hash);
        }

        match removed {
            Some(_) => Ok(()),
            None => Err(Error::PeerNotFound),
        }
    }

    /// Returns up to `numwant` peers for the requester, never including the
    /// requester's own endpoint. A missing swarm yields an empty list.
    ///
    /// Only peers in the requester's address family are visible; peer
    /// selection policy lives in [`Swarm::select_peers`].
    #[must_use]
    pub fn announce_peers(&self, info_hash: &InfoHash, requester: &Peer, numwant: usize) -> Vec<Peer> {
        let swarms = self.read_shard(info_hash, requester.address_family());

        match swarms.get(info_hash) {
            Some(swarm) => swarm.select_peers(requester.is_seeder(), &requester.peer_addr, numwant),
            None => Vec::new(),
        }
    }

    /// Seeder and leecher counts for one infohash in one address family.
    /// A missing swarm yields zeroed metadata.
    #[must_use]
    pub fn swarm_metadata(&self, info_hash: &InfoHash, family: AddressFamily) -> SwarmMetadata {
        let swarms = self.read_shard(info_hash, family);

        swarms.get(info_hash).map_or_else(SwarmMetadata::zeroed, Swarm::metadata)
    }

    /// Aggregate counts for a list of infohashes, preserving the request
    /// order. Missing swarms yield zeroed entries; `downloaded` is always
    /// reported as zero because completion accounting is owned by an
    /// external collaborator.
    #[must_use]
    pub fn scrape(&self, info_hashes: &[InfoHash], family: AddressFamily) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            scrape_data.add_file(info_hash, self.swarm_metadata(info_hash, family));
        }

        scrape_data
    }

    /// Removes every entry whose last observation is at or before the cutoff
    /// and deletes the swarms that become empty.
    ///
    /// The write lock is taken per shard and the task yields between shards
    /// so that announce handlers are never starved for longer than one shard
    /// pass.
    pub async fn collect_garbage(&self, current_cutoff: DurationSinceUnixEpoch) -> GarbageCollection {
        let mut stats = GarbageCollection::default();

        for shard in &self.shards {
            {
                let mut swarms = shard.write().expect("shard lock is never poisoned");

                let swarms_before = swarms.len();

                swarms.retain(|_, swarm| {
                    stats.peers_removed += swarm.remove_expired(current_cutoff);
                    !swarm.is_empty()
                });

                stats.swarms_removed += swarms_before - swarms.len();
            }

            tokio::task::yield_now().await;
        }

        tracing::debug!(
            peers_removed = stats.peers_removed,
            swarms_removed = stats.swarms_removed,
            "collected garbage"
        );

        stats
    }

    /// Total number of entries across all shards.
    #[must_use]
    pub fn count_peers(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .read()
                    .expect("shard lock is never poisoned")
                    .values()
                    .map(Swarm::len)
                    .sum::<usize>()
            })
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards
            .iter()
            .all(|shard| shard.read().expect("shard lock is never poisoned").is_empty())
    }

    fn shard_index(&self, info_hash: &InfoHash, family: AddressFamily) -> usize {
        let prefix = u32::from_be_bytes(
            info_hash.0[0..4]
                .try_into()
                .expect("an infohash always has at least 4 bytes"),
        );

        let pair = (prefix as usize) % self.shard_pairs;

        match family {
            AddressFamily::V4 => pair * 2,
            AddressFamily::V6 => pair * 2 + 1,
        }
    }

    fn read_shard(&self, info_hash: &InfoHash, family: AddressFamily) -> std::sync::RwLockReadGuard<'_, ShardMap> {
        self.shards[self.shard_index(info_hash, family)]
            .read()
            .expect("shard lock is never poisoned")
    }

    fn write_shard(&self, info_hash: &InfoHash, family: AddressFamily) -> std::sync::RwLockWriteGuard<'_, ShardMap> {
        self.shards[self.shard_index(info_hash, family)]
            .write()
            .expect("shard lock is never poisoned")
    }
}
