//! A `BitTorrent` tracker.
//!
//! The application wires the shared core services (the sharded swarm
//! registry and the announce/scrape handlers) to one or more HTTP and UDP
//! front-ends, plus the background jobs: the swarm garbage collector and
//! the per-instance connection-cookie IV rotation.
pub mod app;
pub mod bootstrap;
pub mod container;

use peerhub_clock::clock;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
