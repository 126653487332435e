//! Types and codecs for the `BitTorrent` HTTP tracker protocol.
//!
//! Wire-level parsing of announce and scrape query strings into canonical
//! request values, and bencoded response bodies.
//!
//! Refer to:
//!
//! - [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 7. IPv6 Tracker Extension](https://www.bittorrent.org/beps/bep_0007.html)
//! - [BEP 23. Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
pub mod v1;
