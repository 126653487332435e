//! In-memory whitelist repository.
use std::collections::HashSet;

use peerhub_primitives::info_hash::InfoHash;
use tokio::sync::RwLock;

/// The set of whitelisted infohashes.
#[derive(Debug, Default)]
pub struct InMemoryWhitelist {
    whitelist: RwLock<HashSet<InfoHash>>,
}

impl InMemoryWhitelist {
    /// Adds a torrent to the whitelist. Returns `true` if it was not already
    /// whitelisted.
    pub async fn add(&self, info_hash: &InfoHash) -> bool {
        self.whitelist.write().await.insert(*info_hash)
    }

    /// Removes a torrent from the whitelist. Returns `true` if it was
    /// whitelisted.
    pub async fn remove(&self, info_hash: &InfoHash) -> bool {
        self.whitelist.write().await.remove(info_hash)
    }

    pub async fn contains(&self, info_hash: &InfoHash) -> bool {
        self.whitelist.read().await.contains(info_hash)
    }
}

#[cfg(test)]
mod tests {

    use crate::tests::sample_info_hash;
    use crate::whitelist::repository::InMemoryWhitelist;

    #[tokio::test]
    async fn it_should_add_a_torrent_to_the_whitelist() {
        let whitelist = InMemoryWhitelist::default();

        assert!(whitelist.add(&sample_info_hash()).await);
        assert!(whitelist.contains(&sample_info_hash()).await);
    }

    #[tokio::test]
    async fn it_should_report_an_already_whitelisted_torrent() {
        let whitelist = InMemoryWhitelist::default();

        whitelist.add(&sample_info_hash()).await;

        assert!(!whitelist.add(&sample_info_hash()).await);
    }

    #[tokio::test]
    async fn it_should_remove_a_torrent_from_the_whitelist() {
        let whitelist = InMemoryWhitelist::default();

        whitelist.add(&sample_info_hash()).await;

        assert!(whitelist.remove(&sample_info_hash()).await);
        assert!(!whitelist.contains(&sample_info_hash()).await);
    }

    #[tokio::test]
    async fn it_should_report_removing_a_torrent_that_was_not_whitelisted() {
        let whitelist = InMemoryWhitelist::default();

        assert!(!whitelist.remove(&sample_info_hash()).await);
    }
}
