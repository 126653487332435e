//! Wrapper around the bound UDP socket.
use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// A socket bound to its final address.
pub struct BoundSocket {
    socket: UdpSocket,
    address: SocketAddr,
}

impl BoundSocket {
    /// Binds the socket.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound or the local
    /// address cannot be resolved.
    pub async fn new(bind_address: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind_address).await?;

        let address = socket.local_addr()?;

        Ok(Self { socket, address })
    }

    /// The resolved local address.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub async fn recv_from(&self, buffer: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buffer).await
    }

    pub async fn send_to(&self, payload: &[u8], target: &SocketAddr) -> io::Result<usize> {
        self.socket.send_to(payload, target).await
    }
}
