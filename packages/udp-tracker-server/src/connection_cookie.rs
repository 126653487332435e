//! Connection-ID cookies for the UDP handshake.
//!
//! A cookie binds a client to its source IP: the tracker encrypts a
//! fingerprint of the address with a process-lifetime Blowfish key (64-bit
//! block, so the ciphertext is exactly the 8-byte connection ID of BEP 15)
//! mixed with an IV that a background job rotates periodically. The tracker
//! keeps no per-client state; it re-derives the expected token and compares.
//!
//! Tokens minted under the current or the previous IV are accepted, so a
//! client that connected just before a rotation can still announce. Two
//! rotations invalidate a token for good.
use std::net::IpAddr;
use std::panic::Location;
use std::sync::RwLock;

use blowfish::Blowfish;
use cipher::array::Array;
use cipher::{BlockCipherEncrypt, KeyInit};
use peerhub_udp_protocol::ConnectionId;
use thiserror::Error;

/// Mints and verifies connection-ID cookies.
pub struct ConnectionCookie {
    cipher: Blowfish,
    ivs: RwLock<IvPair>,
}

#[derive(Clone, Copy)]
struct IvPair {
    current: [u8; 8],
    previous: [u8; 8],
}

impl Default for ConnectionCookie {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionCookie {
    /// Creates a cookie generator with a fresh random key and IV.
    ///
    /// # Panics
    ///
    /// Panics if the cipher rejects the key, which cannot happen for a
    /// 32-byte key (Blowfish accepts 4 to 56 bytes).
    #[must_use]
    pub fn new() -> Self {
        let key: [u8; 32] = rand::random();

        let cipher = Blowfish::new_from_slice(&key).expect("a 32-byte key is within the Blowfish key range");

        let iv: [u8; 8] = rand::random();

        Self {
            cipher,
            ivs: RwLock::new(IvPair {
                current: iv,
                previous: iv,
            }),
        }
    }

    /// Derives the connection ID for a client IP under the current IV.
    #[must_use]
    pub fn generate(&self, remote_ip: &IpAddr) -> ConnectionId {
        let ivs = self.ivs.read().expect("cookie IV lock is never poisoned");

        self.encrypt(fingerprint(remote_ip), ivs.current)
    }

    /// Checks a presented connection ID against the current and the previous
    /// IV.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionCookieError::InvalidConnectionId`] when the token
    /// matches neither.
    pub fn check(&self, connection_id: &ConnectionId, remote_ip: &IpAddr) -> Result<(), ConnectionCookieError> {
        let ivs = *self.ivs.read().expect("cookie IV lock is never poisoned");

        let fingerprint = fingerprint(remote_ip);

        if self.encrypt(fingerprint, ivs.current) == *connection_id {
            return Ok(());
        }

        if self.encrypt(fingerprint, ivs.previous) == *connection_id {
            return Ok(());
        }

        Err(ConnectionCookieError::InvalidConnectionId {
            location: Location::caller(),
        })
    }

    /// Replaces the IV, keeping the old one for the grace window.
    pub fn rotate_iv(&self) {
        let new_iv: [u8; 8] = rand::random();

        let mut ivs = self.ivs.write().expect("cookie IV lock is never poisoned");

        ivs.previous = ivs.current;
        ivs.current = new_iv;
    }

    fn encrypt(&self, fingerprint: [u8; 8], iv: [u8; 8]) -> ConnectionId {
        let mut block = [0u8; 8];
        for (byte, (fingerprint_byte, iv_byte)) in block.iter_mut().zip(fingerprint.iter().zip(iv.iter())) {
            *byte = fingerprint_byte ^ iv_byte;
        }

        let mut block = Array::clone_from_slice(&block);

        self.cipher.encrypt_block(&mut block);

        ConnectionId::from_be_bytes(block.into())
    }
}

/// Folds a client IP into the 8-byte cipher block.
fn fingerprint(remote_ip: &IpAddr) -> [u8; 8] {
    match remote_ip {
        IpAddr::V4(ip) => {
            let octets = ip.octets();
            [octets[0], octets[1], octets[2], octets[3], octets[0], octets[1], octets[2], octets[3]]
        }
        IpAddr::V6(ip) => {
            let octets = ip.octets();
            let mut folded = [0u8; 8];
            for (index, byte) in octets.iter().enumerate() {
                folded[index % 8] ^= byte;
            }
            folded
        }
    }
}

/// Errors raised while verifying a connection cookie. The message is what
/// the client sees in the error action.
#[derive(Error, Debug, Clone)]
pub enum ConnectionCookieError {
    #[error("bad connection ID")]
    InvalidConnectionId { location: &'static Location<'static> },
}
