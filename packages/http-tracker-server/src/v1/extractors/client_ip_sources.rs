//! Collects the sources the peer IP can be resolved from.
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use peerhub_http_protocol::v1::services::peer_ip_resolver::ClientIpSources;

/// Builds the [`ClientIpSources`] for one request from the connection info
/// and the proxy headers.
#[must_use]
pub fn extract_client_ip_sources(headers: &HeaderMap, connection_info_socket_address: SocketAddr) -> ClientIpSources {
    ClientIpSources {
        right_most_x_forwarded_for: right_most_x_forwarded_for(headers),
        connection_info_socket_address: Some(connection_info_socket_address),
    }
}

/// The right-most entry of the last `X-Forwarded-For` header, which is the
/// entry written by the proxy closest to this server.
fn right_most_x_forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all("X-Forwarded-For")
        .iter()
        .next_back()?
        .to_str()
        .ok()?
        .split(',')
        .next_back()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use axum::http::HeaderMap;

    use crate::v1::extractors::client_ip_sources::extract_client_ip_sources;

    fn sample_connection_info() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 195)), 8080)
    }

    #[test]
    fn it_should_always_carry_the_connection_info_socket_address() {
        let sources = extract_client_ip_sources(&HeaderMap::new(), sample_connection_info());

        assert_eq!(sources.connection_info_socket_address, Some(sample_connection_info()));
        assert_eq!(sources.right_most_x_forwarded_for, None);
    }

    #[test]
    fn it_should_take_the_right_most_ip_from_the_x_forwarded_for_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "126.0.0.1, 126.0.0.2".parse().unwrap());

        let sources = extract_client_ip_sources(&headers, sample_connection_info());

        assert_eq!(
            sources.right_most_x_forwarded_for,
            Some(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)))
        );
    }

    #[test]
    fn a_garbage_x_forwarded_for_header_should_be_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "not-an-ip".parse().unwrap());

        let sources = extract_client_ip_sources(&headers, sample_connection_info());

        assert_eq!(sources.right_most_x_forwarded_for, None);
    }
}
