//! Response packets: connect, announce, scrape and error.
use std::io::{self, Cursor, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::{
    ConnectionId, NumberOfDownloads, NumberOfPeers, TransactionId, ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_ERROR,
    ACTION_SCRAPE,
};

/// Reply to a `connect` request: the freshly minted connection ID.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ConnectResponse {
    pub transaction_id: TransactionId,
    pub connection_id: ConnectionId,
}

/// Reply to an `announce` request.
///
/// Peer records are 6 bytes for IPv4 and 18 bytes for IPv6. A reply is
/// always homogeneous: the server answers with peers of the family of the
/// client's socket address.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AnnounceResponse {
    pub transaction_id: TransactionId,
    pub announce_interval: i32,
    pub leechers: NumberOfPeers,
    pub seeders: NumberOfPeers,
    pub peers: Vec<ResponsePeer>,
}

/// One (ip, port) record of an announce reply.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ResponsePeer {
    pub ip_address: IpAddr,
    pub port: u16,
}

/// Reply to a `scrape` request: one statistics triple per requested
/// infohash, in request order.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScrapeResponse {
    pub transaction_id: TransactionId,
    pub torrent_stats: Vec<TorrentScrapeStatistics>,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct TorrentScrapeStatistics {
    pub seeders: NumberOfPeers,
    pub completed: NumberOfDownloads,
    pub leechers: NumberOfPeers,
}

/// Error reply: the echoed transaction ID and a nul-terminated ASCII
/// message.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ErrorResponse {
    pub transaction_id: TransactionId,
    pub message: String,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Response {
    Connect(ConnectResponse),
    Announce(AnnounceResponse),
    Scrape(ScrapeResponse),
    Error(ErrorResponse),
}

impl From<ConnectResponse> for Response {
    fn from(response: ConnectResponse) -> Self {
        Self::Connect(response)
    }
}

impl From<AnnounceResponse> for Response {
    fn from(response: AnnounceResponse) -> Self {
        Self::Announce(response)
    }
}

impl From<ScrapeResponse> for Response {
    fn from(response: ScrapeResponse) -> Self {
        Self::Scrape(response)
    }
}

impl From<ErrorResponse> for Response {
    fn from(response: ErrorResponse) -> Self {
        Self::Error(response)
    }
}

/// Errors raised while parsing a response packet. Only tracker clients and
/// tests parse responses.
#[derive(Error, Debug)]
pub enum ResponseParseError {
    #[error("response packet too short")]
    TooShort,

    #[error("invalid response action {action}")]
    InvalidAction { action: i32 },

    #[error("invalid peer record framing")]
    InvalidPeerRecords,
}

impl Response {
    /// Serializes the response.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer fails.
    pub fn write_bytes(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Response::Connect(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_CONNECT)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;
                writer.write_i64::<NetworkEndian>(response.connection_id.0)?;
            }

            Response::Announce(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_ANNOUNCE)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;
                writer.write_i32::<NetworkEndian>(response.announce_interval)?;
                writer.write_i32::<NetworkEndian>(response.leechers.0)?;
                writer.write_i32::<NetworkEndian>(response.seeders.0)?;

                for peer in &response.peers {
                    match peer.ip_address {
                        IpAddr::V4(ip) => writer.write_all(&ip.octets())?,
                        IpAddr::V6(ip) => writer.write_all(&ip.octets())?,
                    }
                    writer.write_u16::<NetworkEndian>(peer.port)?;
                }
            }

            Response::Scrape(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_SCRAPE)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;

                for stats in &response.torrent_stats {
                    writer.write_i32::<NetworkEndian>(stats.seeders.0)?;
                    writer.write_i32::<NetworkEndian>(stats.completed.0)?;
                    writer.write_i32::<NetworkEndian>(stats.leechers.0)?;
                }
            }

            Response::Error(response) => {
                writer.write_i32::<NetworkEndian>(ACTION_ERROR)?;
                writer.write_i32::<NetworkEndian>(response.transaction_id.0)?;
                writer.write_all(response.message.as_bytes())?;
                writer.write_all(&[0u8])?;
            }
        }

        Ok(())
    }

    /// Parses a response packet.
    ///
    /// The announce reply layout does not encode the address family, so the
    /// caller states whether it expects IPv4 records (it knows from the
    /// socket it sent the request on).
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseParseError`] when the packet is malformed.
    pub fn parse_bytes(bytes: &[u8], ipv4: bool) -> Result<Self, ResponseParseError> {
        let mut cursor = Cursor::new(bytes);

        let action = cursor.read_i32::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;
        let transaction_id = cursor.read_i32::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;

        match action {
            ACTION_CONNECT => {
                let connection_id = cursor.read_i64::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;

                Ok(ConnectResponse {
                    transaction_id: TransactionId(transaction_id),
                    connection_id: ConnectionId(connection_id),
                }
                .into())
            }

            ACTION_ANNOUNCE => {
                let announce_interval = cursor.read_i32::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;
                let leechers = cursor.read_i32::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;
                let seeders = cursor.read_i32::<NetworkEndian>().map_err(|_| ResponseParseError::TooShort)?;

                let body = &bytes[cursor.position() as usize..];
                let record_len = if ipv4 { 6 } else { 18 };

                if body.len() % record_len != 0 {
                    return Err(ResponseParseError::InvalidPeerRecords);
                }

                let peers = body
                    .chunks_exact(record_len)
                    .map(|record| {
                        let (ip_bytes, port_bytes) = record.split_at(record_len - 2);

                        let ip_address = if ipv4 {
                            let octets: [u8; 4] = ip_bytes.try_into().expect("ipv4 records carry 4 address bytes");
                            IpAddr::V4(Ipv4Addr::from(octets))
                        } else {
                            let octets: [u8; 16] = ip_bytes.try_into().expect("ipv6 records carry 16 address bytes");
                            IpAddr::V6(Ipv6Addr::from(octets))
                        };

                        ResponsePeer {
                            ip_address,
                            port: u16::from_be_bytes(port_bytes.try_into().expect("records end with 2 port bytes")),
                        }
                    })
                    .collect();

                Ok(AnnounceResponse {
                    transaction_id: TransactionId(transaction_id),
                    announce_interval,
                    leechers: NumberOfPeers(leechers),
                    seeders: NumberOfPeers(seeders),
                    peers,
                }
                .into())
            }

            ACTION_SCRAPE => {
                let body = &bytes[cursor.position() as usize..];

                if body.len() % 12 != 0 {
                    return Err(ResponseParseError::InvalidPeerRecords);
                }

                let torrent_stats = body
                    .chunks_exact(12)
                    .map(|record| TorrentScrapeStatistics {
                        seeders: NumberOfPeers(i32::from_be_bytes(record[0..4].try_into().expect("4 bytes"))),
                        completed: NumberOfDownloads(i32::from_be_bytes(record[4..8].try_into().expect("4 bytes"))),
                        leechers: NumberOfPeers(i32::from_be_bytes(record[8..12].try_into().expect("4 bytes"))),
                    })
                    .collect();

                Ok(ScrapeResponse {
                    transaction_id: TransactionId(transaction_id),
                    torrent_stats,
                }
                .into())
            }

            ACTION_ERROR => {
                let body = &bytes[cursor.position() as usize..];
                let message_bytes = body.strip_suffix(&[0u8]).unwrap_or(body);

                Ok(ErrorResponse {
                    transaction_id: TransactionId(transaction_id),
                    message: String::from_utf8_lossy(message_bytes).into_owned(),
                }
                .into())
            }

            action => Err(ResponseParseError::InvalidAction { action }),
        }
    }
}
