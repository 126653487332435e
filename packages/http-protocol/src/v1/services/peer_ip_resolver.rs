//! This service resolves the remote client IP.
//!
//! The peer IP identifies the peer in the swarm registry: it's the IP
//! advertised to other peers and the one statistics are attributed to.
//!
//! Given this request chain:
//!
//! ```text
//! client          <-> http proxy 1                 <-> http proxy 2                          <-> server
//! ip: 126.0.0.1       ip: 126.0.0.2                    ip: 126.0.0.3                             ip: 126.0.0.4
//!                     X-Forwarded-For: 126.0.0.1       X-Forwarded-For: 126.0.0.1,126.0.0.2
//! ```
//!
//! the sources available to the server are:
//!
//! ```text
//! right_most_x_forwarded_for = 126.0.0.2
//! connection_info_ip         = 126.0.0.3
//! ```
//!
//! Which one wins depends on whether the tracker is deployed behind a
//! reverse proxy. The `X-Forwarded-For` header can be forged by the client,
//! so it is only trusted in reverse proxy mode where the proxy overwrites
//! the right-most entry.
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether the tracker is deployed behind a reverse proxy.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReverseProxyMode {
    Enabled,
    Disabled,
}

impl From<bool> for ReverseProxyMode {
    fn from(on_reverse_proxy: bool) -> Self {
        if on_reverse_proxy {
            ReverseProxyMode::Enabled
        } else {
            ReverseProxyMode::Disabled
        }
    }
}

/// The sources from which the client IP can be obtained.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ClientIpSources {
    /// The right-most IP from the `X-Forwarded-For` HTTP header.
    pub right_most_x_forwarded_for: Option<IpAddr>,

    /// The client's socket address from the connection info.
    pub connection_info_socket_address: Option<SocketAddr>,
}

/// Resolves the client IP from the available sources according to the
/// deployment mode.
///
/// # Errors
///
/// Returns an error when the source mandated by the mode is missing.
pub fn resolve_remote_client_ip(
    reverse_proxy_mode: ReverseProxyMode,
    client_ip_sources: &ClientIpSources,
) -> Result<IpAddr, PeerIpResolutionError> {
    match reverse_proxy_mode {
        ReverseProxyMode::Enabled => {
            client_ip_sources
                .right_most_x_forwarded_for
                .ok_or(PeerIpResolutionError::MissingRightMostXForwardedForIp {
                    location: Location::caller(),
                })
        }
        ReverseProxyMode::Disabled => client_ip_sources
            .connection_info_socket_address
            .map(|socket_addr| socket_addr.ip())
            .ok_or(PeerIpResolutionError::MissingClientIp {
                location: Location::caller(),
            }),
    }
}

/// The error that can occur when resolving the peer IP.
#[derive(Error, Debug, Clone)]
pub enum PeerIpResolutionError {
    /// The tracker is configured as a reverse proxy but the `X-Forwarded-For`
    /// HTTP header is missing or invalid.
    #[error(
        "missing or invalid the right most X-Forwarded-For IP (mandatory on reverse proxy tracker configuration) in {location}"
    )]
    MissingRightMostXForwardedForIp { location: &'static Location<'static> },

    /// The tracker is not behind a reverse proxy but the connection info was
    /// not provided to the handler.
    #[error("cannot get the client IP from the connection info in {location}")]
    MissingClientIp { location: &'static Location<'static> },
}
