//! Tracker usage statistics.
//!
//! Counters are the post-hook of the request pipelines: the front-ends record
//! every handled request after the response is computed. Recording can never
//! fail and never affects the client response.
pub mod metrics;
pub mod repository;

/// The protocol a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Udp,
}
