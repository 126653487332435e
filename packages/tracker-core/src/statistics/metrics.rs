//! The counters kept per protocol and address family.
use serde::Serialize;

/// A point-in-time copy of the tracker metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Total number of handled `announce` requests on the HTTP tracker from
    /// IPv4 clients.
    pub tcp4_announces_handled: u64,

    /// Total number of handled `scrape` requests on the HTTP tracker from
    /// IPv4 clients.
    pub tcp4_scrapes_handled: u64,

    /// Total number of handled `announce` requests on the HTTP tracker from
    /// IPv6 clients.
    pub tcp6_announces_handled: u64,

    /// Total number of handled `scrape` requests on the HTTP tracker from
    /// IPv6 clients.
    pub tcp6_scrapes_handled: u64,

    /// Total number of handled `connect` requests on the UDP tracker from
    /// IPv4 clients.
    pub udp4_connections_handled: u64,

    /// Total number of handled `announce` requests on the UDP tracker from
    /// IPv4 clients.
    pub udp4_announces_handled: u64,

    /// Total number of handled `scrape` requests on the UDP tracker from
    /// IPv4 clients.
    pub udp4_scrapes_handled: u64,

    /// Total number of handled `connect` requests on the UDP tracker from
    /// IPv6 clients.
    pub udp6_connections_handled: u64,

    /// Total number of handled `announce` requests on the UDP tracker from
    /// IPv6 clients.
    pub udp6_announces_handled: u64,

    /// Total number of handled `scrape` requests on the UDP tracker from
    /// IPv6 clients.
    pub udp6_scrapes_handled: u64,

    /// Total number of error responses sent by the UDP tracker.
    pub udp_errors_handled: u64,
}
