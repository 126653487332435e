//! Wire codec for the `BitTorrent` UDP tracker protocol.
//!
//! Packet layouts are defined by
//! [BEP 15: UDP Tracker Protocol](https://www.bittorrent.org/beps/bep_0015.html).
//! All integers are big endian.
pub mod request;
pub mod response;

/// The protocol identifier every `connect` request must carry as its initial
/// connection ID: `0x0000041727101980`.
pub const PROTOCOL_ID: i64 = 0x0417_2710_1980;

/// Wire codes for the four packet kinds.
pub const ACTION_CONNECT: i32 = 0;
pub const ACTION_ANNOUNCE: i32 = 1;
pub const ACTION_SCRAPE: i32 = 2;
pub const ACTION_ERROR: i32 = 3;

/// A connection ID token minted by the tracker during the `connect`
/// handshake and presented by the client on every announce and scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub i64);

impl ConnectionId {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(i64::from_be_bytes(bytes))
    }

    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

/// The transaction ID chosen by the client; echoed verbatim in every reply,
/// including error replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub i32);

impl TransactionId {
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(value)
    }
}

/// The opaque session key a client sends with announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PeerKey(pub u32);

/// A peer count on the wire (leechers, seeders, peers wanted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberOfPeers(pub i32);

/// A completion count on the wire (scrape `downloaded` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberOfDownloads(pub i32);
