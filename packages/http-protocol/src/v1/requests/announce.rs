//! The `announce` request.
//!
//! ```text
//! GET /announce?info_hash=<20 bytes>&peer_id=<20 bytes>&port=6881
//!     &uploaded=0&downloaded=0&left=0
//!     [&event=started|completed|stopped|paused][&numwant=50][&compact=1]
//!     [&ip=<addr>|ipv4=<addr>|ipv6=<addr>][&key=<opaque>]
//! ```
use std::net::IpAddr;
use std::panic::Location;
use std::str::FromStr;

use peerhub_primitives::announce_event::AnnounceEvent;
use peerhub_primitives::info_hash::InfoHash;
use peerhub_primitives::peer::PeerId;
use peerhub_primitives::NumberOfBytes;
use thiserror::Error;

use crate::v1::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};
use crate::v1::query::Query;

/// Whether the client accepts a compact (binary packed) peer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compact {
    Accepted,
    NotAccepted,
}

/// A validated `announce` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announce {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
    pub event: Option<AnnounceEvent>,
    pub compact: Option<Compact>,
    pub numwant: Option<u32>,

    /// The IP the client claims to be reachable at. Only honored when the
    /// tracker allows IP spoofing.
    pub ip: Option<IpAddr>,

    /// Opaque session token some clients send to keep their identity across
    /// IP changes. The core carries it but does not interpret it.
    pub key: Option<String>,
}

impl TryFrom<Query> for Announce {
    type Error = ParseAnnounceQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        let announce = Self {
            info_hash: extract_info_hash(&query)?,
            peer_id: extract_peer_id(&query)?,
            port: extract_number(&query, "port")?,
            uploaded: NumberOfBytes::new(extract_number(&query, "uploaded")?),
            downloaded: NumberOfBytes::new(extract_number(&query, "downloaded")?),
            left: NumberOfBytes::new(extract_number(&query, "left")?),
            event: extract_event(&query)?,
            compact: extract_compact(&query)?,
            numwant: extract_optional_number(&query, "numwant")?,
            ip: extract_ip(&query)?,
            key: query.get_param("key"),
        };

        // An inconsistent combination is a bad request, not a missing param:
        // a peer cannot have completed the download with bytes still left.
        if announce.event == Some(AnnounceEvent::Completed) && announce.left.0 > 0 {
            return Err(ParseAnnounceQueryError::InconsistentEvent {
                location: Location::caller(),
                left: announce.left.0,
            });
        }

        Ok(announce)
    }
}

fn extract_info_hash(query: &Query) -> Result<InfoHash, ParseAnnounceQueryError> {
    let raw = query
        .get_raw_param("info_hash")
        .ok_or(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: "info_hash".to_string(),
        })?;

    percent_decode_info_hash(raw).map_err(|_| ParseAnnounceQueryError::InvalidParam {
        location: Location::caller(),
        param_name: "info_hash".to_string(),
        param_value: raw.to_string(),
    })
}

fn extract_peer_id(query: &Query) -> Result<PeerId, ParseAnnounceQueryError> {
    let raw = query.get_raw_param("peer_id").ok_or(ParseAnnounceQueryError::MissingParam {
        location: Location::caller(),
        param_name: "peer_id".to_string(),
    })?;

    percent_decode_peer_id(raw).map_err(|_| ParseAnnounceQueryError::InvalidParam {
        location: Location::caller(),
        param_name: "peer_id".to_string(),
        param_value: raw.to_string(),
    })
}

fn extract_number<T: FromStr>(query: &Query, param_name: &str) -> Result<T, ParseAnnounceQueryError> {
    let value = query.get_param(param_name).ok_or(ParseAnnounceQueryError::MissingParam {
        location: Location::caller(),
        param_name: param_name.to_string(),
    })?;

    value.parse().map_err(|_| ParseAnnounceQueryError::InvalidParam {
        location: Location::caller(),
        param_name: param_name.to_string(),
        param_value: value.clone(),
    })
}

fn extract_optional_number<T: FromStr>(query: &Query, param_name: &str) -> Result<Option<T>, ParseAnnounceQueryError> {
    match query.get_param(param_name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ParseAnnounceQueryError::InvalidParam {
                location: Location::caller(),
                param_name: param_name.to_string(),
                param_value: value.clone(),
            }),
    }
}

fn extract_event(query: &Query) -> Result<Option<AnnounceEvent>, ParseAnnounceQueryError> {
    match query.get_param("event") {
        None => Ok(None),
        Some(raw_event) => raw_event
            .parse()
            .map(Some)
            .map_err(|_| ParseAnnounceQueryError::InvalidParam {
                location: Location::caller(),
                param_name: "event".to_string(),
                param_value: raw_event.clone(),
            }),
    }
}

fn extract_compact(query: &Query) -> Result<Option<Compact>, ParseAnnounceQueryError> {
    match query.get_param("compact").as_deref() {
        None => Ok(None),
        Some("1") => Ok(Some(Compact::Accepted)),
        Some("0") => Ok(Some(Compact::NotAccepted)),
        Some(other) => Err(ParseAnnounceQueryError::InvalidParam {
            location: Location::caller(),
            param_name: "compact".to_string(),
            param_value: other.to_string(),
        }),
    }
}

fn extract_ip(query: &Query) -> Result<Option<IpAddr>, ParseAnnounceQueryError> {
    for param_name in ["ip", "ipv4", "ipv6"] {
        if let Some(value) = query.get_param(param_name) {
            let ip = value.parse().map_err(|_| ParseAnnounceQueryError::InvalidParam {
                location: Location::caller(),
                param_name: param_name.to_string(),
                param_value: value.clone(),
            })?;

            return Ok(Some(ip));
        }
    }

    Ok(None)
}

/// Errors raised while parsing an announce query. All of them are client
/// errors: the failure reason is sent back in a bencoded body with HTTP 200.
#[derive(Error, Debug)]
pub enum ParseAnnounceQueryError {
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

    #[error("cannot announce a completed event with {left} bytes left in {location}")]
    InconsistentEvent {
        location: &'static Location<'static>,
        left: u64,
    },
}
