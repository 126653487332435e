//! UDP tracker front-end.
//!
//! A single bound socket; every datagram is handled by its own task. The
//! `connect` handshake hands out connection-ID cookies that bind a client to
//! its source address, which is the protocol's defense against being used
//! for traffic reflection.
pub mod connection_cookie;
pub mod container;
pub mod error;
pub mod handlers;
pub mod peer_builder;
pub mod server;

use std::net::SocketAddr;

pub const UDP_TRACKER_LOG_TARGET: &str = "UDP TRACKER";

/// A datagram as it came off the socket.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
}
