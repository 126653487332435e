//! Peer struct used by the swarm registry.
//!
//! A sample peer:
//!
//! ```rust,no_run
//! use std::net::{IpAddr, Ipv4Addr, SocketAddr};
//!
//! use peerhub_primitives::announce_event::AnnounceEvent;
//! use peerhub_primitives::peer::{Peer, PeerId};
//! use peerhub_primitives::{DurationSinceUnixEpoch, NumberOfBytes};
//!
//! Peer {
//!     peer_id: PeerId(*b"-qB00000000000000000"),
//!     peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
//!     updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
//!     uploaded: NumberOfBytes::new(0),
//!     downloaded: NumberOfBytes::new(0),
//!     left: NumberOfBytes::new(0),
//!     event: AnnounceEvent::Started,
//! };
//! ```
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

use crate::announce_event::AnnounceEvent;
use crate::{AddressFamily, DurationSinceUnixEpoch, NumberOfBytes};

pub const PEER_ID_BYTES_LEN: usize = 20;

/// ID chosen by the downloader peer. The first 6-7 bytes conventionally
/// identify the client implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub [u8; PEER_ID_BYTES_LEN]);

impl PeerId {
    /// Hex representation used in logs, e.g.
    /// `0x2d71423030303030303030303030303030303030` for `-qB00000000000000000`.
    ///
    /// # Panics
    ///
    /// It will panic if the output buffer for `binascii::bin2hex` is too
    /// small, which cannot happen for a fixed 40-byte buffer.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut out = [0u8; PEER_ID_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut out).expect("output buffer fits 40 hex chars");
        format!("0x{}", String::from_utf8_lossy(&out))
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for PeerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl TryFrom<&[u8]> for PeerId {
    type Error = IdConversionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PEER_ID_BYTES_LEN {
            return Err(IdConversionError::InvalidNumberOfBytes {
                location: Location::caller(),
                len: bytes.len(),
            });
        }

        let mut data = [0u8; PEER_ID_BYTES_LEN];
        data.copy_from_slice(bytes);

        Ok(PeerId(data))
    }
}

/// Error returned when trying to convert an invalid peer id from another type.
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("invalid number of bytes for peer id: got {len}, expected 20, in {location}")]
    InvalidNumberOfBytes {
        location: &'static Location<'static>,
        len: usize,
    },
}

/// The role a peer plays in a swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    Seeder,
    Leecher,
}

impl std::fmt::Display for PeerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerRole::Seeder => write!(f, "seeder"),
            PeerRole::Leecher => write!(f, "leecher"),
        }
    }
}

/// Peer participating in a swarm.
///
/// Two peers are equal iff peer id, IP and port all match. Two peers share an
/// endpoint iff IP and port match; the endpoint is what is excluded when
/// returning peer lists to the peer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Peer {
    /// ID used by the downloader peer.
    pub peer_id: PeerId,

    /// The IP and port this peer is listening on.
    pub peer_addr: SocketAddr,

    /// The last time the tracker received an announce request from this peer.
    pub updated: DurationSinceUnixEpoch,

    /// The total amount of bytes uploaded by this peer so far.
    pub uploaded: NumberOfBytes,

    /// The total amount of bytes downloaded by this peer so far.
    pub downloaded: NumberOfBytes,

    /// The number of bytes this peer still has to download.
    pub left: NumberOfBytes,

    /// The event announced with this observation.
    pub event: AnnounceEvent,
}

impl Peer {
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left.0 == 0 && !self.event.is_terminal()
    }

    #[must_use]
    pub fn is_leecher(&self) -> bool {
        !self.is_seeder()
    }

    #[must_use]
    pub fn role(&self) -> PeerRole {
        if self.is_seeder() {
            PeerRole::Seeder
        } else {
            PeerRole::Leecher
        }
    }

    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.peer_addr.ip()
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.peer_addr.port()
    }

    #[must_use]
    pub fn address_family(&self) -> AddressFamily {
        self.peer_addr.ip().into()
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }

    /// True iff both peers listen on the same IP and port.
    #[must_use]
    pub fn shares_endpoint_with(&self, other_addr: &SocketAddr) -> bool {
        self.peer_addr == *other_addr
    }
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::{Peer, PeerId};
    use crate::announce_event::AnnounceEvent;
    use crate::{DurationSinceUnixEpoch, NumberOfBytes};

    #[derive(PartialEq, Debug)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    #[allow(clippy::derivable_impls)]
    impl Default for PeerBuilder {
        fn default() -> Self {
            Self { peer: Peer::default() }
        }
    }

    impl PeerBuilder {
        #[must_use]
        pub fn seeder() -> Self {
            let peer = Peer {
                peer_id: PeerId(*b"-qB00000000000000001"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes::new(0),
                downloaded: NumberOfBytes::new(0),
                left: NumberOfBytes::new(0),
                event: AnnounceEvent::Completed,
            };

            Self { peer }
        }

        #[must_use]
        pub fn leecher() -> Self {
            let peer = Peer {
                peer_id: PeerId(*b"-qB00000000000000002"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes::new(0),
                downloaded: NumberOfBytes::new(0),
                left: NumberOfBytes::new(10),
                event: AnnounceEvent::Started,
            };

            Self { peer }
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &PeerId) -> Self {
            self.peer.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_peer_addr(mut self, peer_addr: &SocketAddr) -> Self {
            self.peer.peer_addr = *peer_addr;
            self
        }

        #[must_use]
        pub fn with_bytes_left_to_download(mut self, left: u64) -> Self {
            self.peer.left = NumberOfBytes::new(left);
            self
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.peer.event = event;
            self
        }

        #[must_use]
        pub fn updated_on(mut self, updated: DurationSinceUnixEpoch) -> Self {
            self.peer.updated = updated;
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }

    impl Default for Peer {
        fn default() -> Self {
            Self {
                peer_id: PeerId(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes::new(0),
                downloaded: NumberOfBytes::new(0),
                left: NumberOfBytes::new(0),
                event: AnnounceEvent::Started,
            }
        }
    }
}
