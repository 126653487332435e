//! Atomic storage for the tracker metrics.
use std::sync::atomic::{AtomicU64, Ordering};

use peerhub_primitives::AddressFamily;

use crate::statistics::metrics::Metrics;
use crate::statistics::Protocol;

/// Shared metric counters. All operations are relaxed atomic increments, so
/// recording is cheap enough to sit on the hot path of every request.
#[derive(Debug, Default)]
pub struct Repository {
    tcp4_announces_handled: AtomicU64,
    tcp4_scrapes_handled: AtomicU64,
    tcp6_announces_handled: AtomicU64,
    tcp6_scrapes_handled: AtomicU64,
    udp4_connections_handled: AtomicU64,
    udp4_announces_handled: AtomicU64,
    udp4_scrapes_handled: AtomicU64,
    udp6_connections_handled: AtomicU64,
    udp6_announces_handled: AtomicU64,
    udp6_scrapes_handled: AtomicU64,
    udp_errors_handled: AtomicU64,
}

impl Repository {
    pub fn record_announce(&self, protocol: Protocol, family: AddressFamily) {
        let counter = match (protocol, family) {
            (Protocol::Http, AddressFamily::V4) => &self.tcp4_announces_handled,
            (Protocol::Http, AddressFamily::V6) => &self.tcp6_announces_handled,
            (Protocol::Udp, AddressFamily::V4) => &self.udp4_announces_handled,
            (Protocol::Udp, AddressFamily::V6) => &self.udp6_announces_handled,
        };

        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scrape(&self, protocol: Protocol, family: AddressFamily) {
        let counter = match (protocol, family) {
            (Protocol::Http, AddressFamily::V4) => &self.tcp4_scrapes_handled,
            (Protocol::Http, AddressFamily::V6) => &self.tcp6_scrapes_handled,
            (Protocol::Udp, AddressFamily::V4) => &self.udp4_scrapes_handled,
            (Protocol::Udp, AddressFamily::V6) => &self.udp6_scrapes_handled,
        };

        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a UDP `connect` handshake. The HTTP tracker has no equivalent.
    pub fn record_connection(&self, family: AddressFamily) {
        let counter = match family {
            AddressFamily::V4 => &self.udp4_connections_handled,
            AddressFamily::V6 => &self.udp6_connections_handled,
        };

        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_udp_error(&self) {
        self.udp_errors_handled.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn metrics(&self) -> Metrics {
        Metrics {
            tcp4_announces_handled: self.tcp4_announces_handled.load(Ordering::Relaxed),
            tcp4_scrapes_handled: self.tcp4_scrapes_handled.load(Ordering::Relaxed),
            tcp6_announces_handled: self.tcp6_announces_handled.load(Ordering::Relaxed),
            tcp6_scrapes_handled: self.tcp6_scrapes_handled.load(Ordering::Relaxed),
            udp4_connections_handled: self.udp4_connections_handled.load(Ordering::Relaxed),
            udp4_announces_handled: self.udp4_announces_handled.load(Ordering::Relaxed),
            udp4_scrapes_handled: self.udp4_scrapes_handled.load(Ordering::Relaxed),
            udp6_connections_handled: self.udp6_connections_handled.load(Ordering::Relaxed),
            udp6_announces_handled: self.udp6_announces_handled.load(Ordering::Relaxed),
            udp6_scrapes_handled: self.udp6_scrapes_handled.load(Ordering::Relaxed),
            udp_errors_handled: self.udp_errors_handled.load(Ordering::Relaxed),
        }
    }
}
