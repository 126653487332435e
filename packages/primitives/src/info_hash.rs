//! The `InfoHash` type: the 20-byte identifier of a torrent.
use std::panic::Location;

use thiserror::Error;

pub const INFO_HASH_BYTES_LEN: usize = 20;

/// `BitTorrent` infohash. The SHA-1 hash of the `info` dictionary of a
/// torrent's metainfo.
///
/// ```rust
/// use peerhub_primitives::info_hash::InfoHash;
///
/// let info_hash: InfoHash = "443c7602b4fde83d1154d6d9da48808418b181b6".parse().unwrap();
///
/// assert_eq!(info_hash.to_string(), "443c7602b4fde83d1154d6d9da48808418b181b6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InfoHash(pub [u8; INFO_HASH_BYTES_LEN]);

impl InfoHash {
    #[must_use]
    pub fn bytes(&self) -> [u8; INFO_HASH_BYTES_LEN] {
        self.0
    }

    /// Returns the lowercase hex representation of the infohash.
    ///
    /// # Panics
    ///
    /// It will panic if the output buffer for `binascii::bin2hex` is too
    /// small, which cannot happen for a fixed 40-byte buffer.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut out = [0u8; INFO_HASH_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut out).expect("output buffer fits 40 hex chars");
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl std::str::FromStr for InfoHash {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != INFO_HASH_BYTES_LEN * 2 {
            return Err(ConversionError::InvalidLength {
                location: Location::caller(),
                len: s.len(),
            });
        }

        let mut bytes = [0u8; INFO_HASH_BYTES_LEN];

        binascii::hex2bin(s.as_bytes(), &mut bytes).map_err(|_| ConversionError::InvalidHexChars {
            location: Location::caller(),
            raw: s.to_string(),
        })?;

        Ok(InfoHash(bytes))
    }
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = ConversionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != INFO_HASH_BYTES_LEN {
            return Err(ConversionError::InvalidLength {
                location: Location::caller(),
                len: bytes.len(),
            });
        }

        let mut data = [0u8; INFO_HASH_BYTES_LEN];
        data.copy_from_slice(bytes);

        Ok(InfoHash(data))
    }
}

impl From<[u8; INFO_HASH_BYTES_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_BYTES_LEN]) -> Self {
        InfoHash(bytes)
    }
}

impl serde::Serialize for InfoHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

/// Error returned when a value cannot be converted into an [`InfoHash`].
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("invalid infohash length {len}, expected 20 bytes (40 hex chars), in {location}")]
    InvalidLength {
        location: &'static Location<'static>,
        len: usize,
    },

    #[error("invalid hex characters in infohash {raw} in {location}")]
    InvalidHexChars {
        location: &'static Location<'static>,
        raw: String,
    },
}
