//! Pieces of the request the handlers need beyond the query string.
pub mod client_ip_sources;
