//! Data returned by the core announce and scrape handlers.
use derive_more::Constructor;
use peerhub_configuration::AnnouncePolicy;

use crate::info_hash::InfoHash;
use crate::peer::Peer;
use crate::swarm_metadata::SwarmMetadata;

/// The data the tracker core returns for an announce request.
///
/// Peers are already split by address family; whether they are rendered as
/// compact byte strings or dictionaries is a response-writer concern.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnounceData {
    /// IPv4 peers in the swarm, excluding the announcing peer's endpoint.
    pub peers_v4: Vec<Peer>,

    /// IPv6 peers in the swarm, excluding the announcing peer's endpoint.
    pub peers_v6: Vec<Peer>,

    /// Swarm statistics after this announce's mutation.
    pub stats: SwarmMetadata,

    /// The tracker announce policy (intervals) to hand back to the client.
    pub policy: AnnouncePolicy,
}

/// The data the tracker core returns for a scrape request: one entry per
/// requested infohash, preserving the request order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrapeData {
    pub files: Vec<ScrapeEntry>,
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct ScrapeEntry {
    pub info_hash: InfoHash,
    pub stats: SwarmMetadata,
}

impl ScrapeData {
    #[must_use]
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// A scrape response with a zeroed entry for each requested infohash.
    #[must_use]
    pub fn zeroed(info_hashes: &[InfoHash]) -> Self {
        Self {
            files: info_hashes
                .iter()
                .map(|info_hash| ScrapeEntry::new(*info_hash, SwarmMetadata::zeroed()))
                .collect(),
        }
    }

    pub fn add_file(&mut self, info_hash: &InfoHash, stats: SwarmMetadata) {
        self.files.push(ScrapeEntry::new(*info_hash, stats));
    }

    pub fn add_file_with_no_stats(&mut self, info_hash: &InfoHash) {
        self.add_file(info_hash, SwarmMetadata::zeroed());
    }
}
