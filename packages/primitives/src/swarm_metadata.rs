use derive_more::Constructor;

/// Swarm statistics for one torrent.
///
/// This is the per-file dictionary of the scrape response.
///
/// See [BEP 48: Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Constructor, serde::Serialize)]
pub struct SwarmMetadata {
    /// (i.e. `downloaded`): The number of peers that have ever completed
    /// downloading a given torrent. Completion accounting is owned by an
    /// external collaborator, so the in-memory registry always reports zero.
    pub downloaded: u32,

    /// (i.e. `complete`): The number of active seeders.
    pub complete: u32,

    /// (i.e. `incomplete`): The number of active leechers.
    pub incomplete: u32,
}

impl SwarmMetadata {
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seeders(&self) -> u32 {
        self.complete
    }

    #[must_use]
    pub fn leechers(&self) -> u32 {
        self.incomplete
    }
}
