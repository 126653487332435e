//! The tracker core: the canonical announce and scrape pipelines.
//!
//! The front-ends parse wire requests into canonical values, run the
//! whitelist pre-hook, call the handlers in this crate and encode the
//! returned data. The handlers own the state-machine decisions (which swarm
//! registry mutation an announce maps to) and the peer selection policy
//! parameters.
pub mod announce_handler;
pub mod scrape_handler;
pub mod statistics;
pub mod whitelist;

use peerhub_clock::clock;

/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
