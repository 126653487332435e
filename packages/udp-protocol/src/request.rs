//! Request packets: connect, announce and scrape.
use std::io::{self, Cursor, Read, Write};
use std::net::Ipv4Addr;

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use peerhub_primitives::announce_event::AnnounceEvent;
use peerhub_primitives::info_hash::{InfoHash, INFO_HASH_BYTES_LEN};
use peerhub_primitives::peer::PeerId;
use peerhub_primitives::NumberOfBytes;
use thiserror::Error;

use crate::{
    ConnectionId, NumberOfPeers, PeerKey, TransactionId, ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_SCRAPE, PROTOCOL_ID,
};

/// The initial request of a UDP session. It must carry [`PROTOCOL_ID`] in
/// the connection ID field.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ConnectRequest {
    pub transaction_id: TransactionId,
}

/// The 98-byte announce request.
///
/// ```text
/// offset  size  field
///      0     8  connection id
///      8     4  action (1)
///     12     4  transaction id
///     16    20  info_hash
///     36    20  peer_id
///     56     8  downloaded
///     64     8  left
///     72     8  uploaded
///     80     4  event (0 none, 1 completed, 2 started, 3 stopped)
///     84     4  IP address (0 = use source address)
///     88     4  key
///     92     4  num_want (-1 = default)
///     96     2  port
/// ```
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct AnnounceRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub bytes_downloaded: NumberOfBytes,
    pub bytes_left: NumberOfBytes,
    pub bytes_uploaded: NumberOfBytes,
    pub event: AnnounceEvent,

    /// The IPv4 address the client claims to be reachable at; zero on the
    /// wire means "use the source address of the datagram".
    pub ip_address: Option<Ipv4Addr>,
    pub key: PeerKey,
    pub peers_wanted: NumberOfPeers,
    pub port: u16,
}

/// A scrape request: the 16-byte header followed by 1 to
/// `max_scrape_torrents` infohashes.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScrapeRequest {
    pub connection_id: ConnectionId,
    pub transaction_id: TransactionId,
    pub info_hashes: Vec<InfoHash>,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Request {
    Connect(ConnectRequest),
    Announce(AnnounceRequest),
    Scrape(ScrapeRequest),
}

impl From<ConnectRequest> for Request {
    fn from(request: ConnectRequest) -> Self {
        Self::Connect(request)
    }
}

impl From<AnnounceRequest> for Request {
    fn from(request: AnnounceRequest) -> Self {
        Self::Announce(request)
    }
}

impl From<ScrapeRequest> for Request {
    fn from(request: ScrapeRequest) -> Self {
        Self::Scrape(request)
    }
}

/// Errors raised while parsing a request packet.
///
/// A *sendable* error carries the transaction ID recovered from the packet
/// header, so the server can reply with an error action; an *unsendable*
/// error means the packet was too mangled to even echo a transaction ID and
/// must be dropped.
#[derive(Error, Debug)]
pub enum RequestParseError {
    #[error("sendable request parse error for transaction {}: {message}", transaction_id.0)]
    Sendable {
        connection_id: ConnectionId,
        transaction_id: TransactionId,
        message: String,
    },

    #[error("unsendable request parse error: {message}")]
    Unsendable { message: String },
}

impl RequestParseError {
    fn sendable(message: &str, connection_id: i64, transaction_id: i32) -> Self {
        Self::Sendable {
            connection_id: ConnectionId(connection_id),
            transaction_id: TransactionId(transaction_id),
            message: message.to_string(),
        }
    }

    fn unsendable(message: &str) -> Self {
        Self::Unsendable {
            message: message.to_string(),
        }
    }
}

impl Request {
    /// Parses a request packet.
    ///
    /// Trailing bytes after the announce fixed layout are ignored (clients
    /// implementing BEP 41 append option data there).
    ///
    /// # Errors
    ///
    /// Returns a [`RequestParseError`] when the packet is malformed; the
    /// error is sendable when a transaction ID could be recovered.
    pub fn parse_bytes(bytes: &[u8], max_scrape_torrents: usize) -> Result<Self, RequestParseError> {
        let mut cursor = Cursor::new(bytes);

        let connection_id = cursor
            .read_i64::<NetworkEndian>()
            .map_err(|_| RequestParseError::unsendable("packet too short for a header"))?;
        let action = cursor
            .read_i32::<NetworkEndian>()
            .map_err(|_| RequestParseError::unsendable("packet too short for a header"))?;
        let transaction_id = cursor
            .read_i32::<NetworkEndian>()
            .map_err(|_| RequestParseError::unsendable("packet too short for a header"))?;

        match action {
            ACTION_CONNECT => {
                if connection_id != PROTOCOL_ID {
                    return Err(RequestParseError::unsendable("protocol identifier missing"));
                }

                Ok(ConnectRequest {
                    transaction_id: TransactionId(transaction_id),
                }
                .into())
            }

            ACTION_ANNOUNCE => {
                let mut info_hash = [0u8; 20];
                let mut peer_id = [0u8; 20];
                let mut ip = [0u8; 4];

                cursor
                    .read_exact(&mut info_hash)
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                cursor
                    .read_exact(&mut peer_id)
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;

                let bytes_downloaded = cursor
                    .read_u64::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                let bytes_left = cursor
                    .read_u64::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                let bytes_uploaded = cursor
                    .read_u64::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;

                let event_code = cursor
                    .read_i32::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                let event = announce_event_from_wire(event_code)
                    .ok_or_else(|| RequestParseError::sendable("invalid announce event", connection_id, transaction_id))?;

                cursor
                    .read_exact(&mut ip)
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;

                let key = cursor
                    .read_u32::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                let peers_wanted = cursor
                    .read_i32::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;
                let port = cursor
                    .read_u16::<NetworkEndian>()
                    .map_err(|_| RequestParseError::sendable("announce packet too short", connection_id, transaction_id))?;

                let opt_ip = if ip == [0u8; 4] { None } else { Some(Ipv4Addr::from(ip)) };

                Ok(AnnounceRequest {
                    connection_id: ConnectionId(connection_id),
                    transaction_id: TransactionId(transaction_id),
                    info_hash: InfoHash(info_hash),
                    peer_id: PeerId(peer_id),
                    bytes_downloaded: NumberOfBytes(bytes_downloaded),
                    bytes_left: NumberOfBytes(bytes_left),
                    bytes_uploaded: NumberOfBytes(bytes_uploaded),
                    event,
                    ip_address: opt_ip,
                    key: PeerKey(key),
                    peers_wanted: NumberOfPeers(peers_wanted),
                    port,
                }
                .into())
            }

            ACTION_SCRAPE => {
                let body = &bytes[cursor.position() as usize..];

                if body.is_empty() || body.len() % INFO_HASH_BYTES_LEN != 0 {
                    return Err(RequestParseError::sendable(
                        "scrape body must be a non-empty multiple of 20 bytes",
                        connection_id,
                        transaction_id,
                    ));
                }

                if body.len() / INFO_HASH_BYTES_LEN > max_scrape_torrents {
                    return Err(RequestParseError::sendable(
                        "too many infohashes in scrape request",
                        connection_id,
                        transaction_id,
                    ));
                }

                let info_hashes = body
                    .chunks_exact(INFO_HASH_BYTES_LEN)
                    .map(|chunk| InfoHash::try_from(chunk).expect("chunks are exactly 20 bytes"))
                    .collect();

                Ok(ScrapeRequest {
                    connection_id: ConnectionId(connection_id),
                    transaction_id: TransactionId(transaction_id),
                    info_hashes,
                }
                .into())
            }

            _ => Err(RequestParseError::sendable("invalid action", connection_id, transaction_id)),
        }
    }

    /// Serializes the request. Used by tracker clients and tests.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer fails.
    pub fn write_bytes(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Request::Connect(request) => {
                writer.write_i64::<NetworkEndian>(PROTOCOL_ID)?;
                writer.write_i32::<NetworkEndian>(ACTION_CONNECT)?;
                writer.write_i32::<NetworkEndian>(request.transaction_id.0)?;
            }

            Request::Announce(request) => {
                writer.write_i64::<NetworkEndian>(request.connection_id.0)?;
                writer.write_i32::<NetworkEndian>(ACTION_ANNOUNCE)?;
                writer.write_i32::<NetworkEndian>(request.transaction_id.0)?;

                writer.write_all(&request.info_hash.0)?;
                writer.write_all(&request.peer_id.0)?;

                writer.write_u64::<NetworkEndian>(request.bytes_downloaded.0)?;
                writer.write_u64::<NetworkEndian>(request.bytes_left.0)?;
                writer.write_u64::<NetworkEndian>(request.bytes_uploaded.0)?;

                writer.write_i32::<NetworkEndian>(announce_event_to_wire(request.event))?;

                writer.write_all(&request.ip_address.map_or([0u8; 4], |ip| ip.octets()))?;

                writer.write_u32::<NetworkEndian>(request.key.0)?;
                writer.write_i32::<NetworkEndian>(request.peers_wanted.0)?;
                writer.write_u16::<NetworkEndian>(request.port)?;
            }

            Request::Scrape(request) => {
                writer.write_i64::<NetworkEndian>(request.connection_id.0)?;
                writer.write_i32::<NetworkEndian>(ACTION_SCRAPE)?;
                writer.write_i32::<NetworkEndian>(request.transaction_id.0)?;

                for info_hash in &request.info_hashes {
                    writer.write_all(&info_hash.0)?;
                }
            }
        }

        Ok(())
    }
}

/// Wire event codes. `paused` does not exist in the UDP protocol.
fn announce_event_from_wire(code: i32) -> Option<AnnounceEvent> {
    match code {
        0 => Some(AnnounceEvent::None),
        1 => Some(AnnounceEvent::Completed),
        2 => Some(AnnounceEvent::Started),
        3 => Some(AnnounceEvent::Stopped),
        _ => None,
    }
}

fn announce_event_to_wire(event: AnnounceEvent) -> i32 {
    match event {
        AnnounceEvent::None => 0,
        AnnounceEvent::Completed => 1,
        AnnounceEvent::Started => 2,
        // There is no wire code for `paused`; a paused peer stops.
        AnnounceEvent::Stopped | AnnounceEvent::Paused => 3,
    }
}
