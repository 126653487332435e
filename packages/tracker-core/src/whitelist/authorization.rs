//! Whitelist authorization: the pre-hook of the announce and scrape
//! pipelines.
use std::panic::Location;
use std::sync::Arc;

use peerhub_configuration::Core;
use peerhub_primitives::info_hash::InfoHash;
use thiserror::Error;

use crate::whitelist::repository::InMemoryWhitelist;

/// Authorizes requests against the whitelist when the tracker runs in listed
/// mode.
pub struct WhitelistAuthorization {
    /// Whether the tracker only serves whitelisted torrents.
    listed: bool,

    /// The in-memory whitelist.
    in_memory_whitelist: Arc<InMemoryWhitelist>,
}

impl WhitelistAuthorization {
    #[must_use]
    pub fn new(config: &Core, in_memory_whitelist: &Arc<InMemoryWhitelist>) -> Self {
        Self {
            listed: config.listed,
            in_memory_whitelist: in_memory_whitelist.clone(),
        }
    }

    /// Checks whether a torrent may be served.
    ///
    /// # Errors
    ///
    /// Returns [`WhitelistError::TorrentNotWhitelisted`] when the tracker is
    /// in listed mode and the torrent is not whitelisted.
    pub async fn authorize(&self, info_hash: &InfoHash) -> Result<(), WhitelistError> {
        if !self.listed {
            return Ok(());
        }

        if self.in_memory_whitelist.contains(info_hash).await {
            return Ok(());
        }

        Err(WhitelistError::TorrentNotWhitelisted {
            info_hash: *info_hash,
            location: Location::caller(),
        })
    }
}

/// Errors raised by the whitelist pre-hook.
#[derive(Error, Debug, Clone)]
pub enum WhitelistError {
    #[error("The torrent: {info_hash}, is not whitelisted, {location}")]
    TorrentNotWhitelisted {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },
}
