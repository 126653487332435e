//! The `scrape` request.
//!
//! ```text
//! GET /scrape?info_hash=<h1>&info_hash=<h2>...
//! ```
use std::panic::Location;

use peerhub_configuration::MAX_SCRAPE_TORRENTS;
use peerhub_primitives::info_hash::InfoHash;
use thiserror::Error;

use crate::v1::percent_encoding::percent_decode_info_hash;
use crate::v1::query::Query;

/// A validated `scrape` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrape {
    /// The scraped infohashes, in request order.
    pub info_hashes: Vec<InfoHash>,
}

impl TryFrom<Query> for Scrape {
    type Error = ParseScrapeQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        let raw_info_hashes = query.get_raw_param_vec("info_hash");

        if raw_info_hashes.is_empty() {
            return Err(ParseScrapeQueryError::MissingParam {
                location: Location::caller(),
                param_name: "info_hash".to_string(),
            });
        }

        if raw_info_hashes.len() > MAX_SCRAPE_TORRENTS {
            return Err(ParseScrapeQueryError::TooManyInfoHashes {
                location: Location::caller(),
                amount: raw_info_hashes.len(),
            });
        }

        let mut info_hashes = Vec::with_capacity(raw_info_hashes.len());

        for raw in raw_info_hashes {
            let info_hash = percent_decode_info_hash(raw).map_err(|_| ParseScrapeQueryError::InvalidParam {
                location: Location::caller(),
                param_name: "info_hash".to_string(),
                param_value: raw.to_string(),
            })?;

            info_hashes.push(info_hash);
        }

        Ok(Scrape { info_hashes })
    }
}

/// Errors raised while parsing a scrape query.
#[derive(Error, Debug)]
pub enum ParseScrapeQueryError {
    #[error("missing param {param_name} in {location}")]
    MissingParam {
        location: &'static Location<'static>,
        param_name: String,
    },

    #[error("invalid param value {param_value} for {param_name} in {location}")]
    InvalidParam {
        location: &'static Location<'static>,
        param_name: String,
        param_value: String,
    },

    #[error("too many infohashes in scrape request: {amount}, in {location}")]
    TooManyInfoHashes {
        location: &'static Location<'static>,
        amount: usize,
    },
}
