//! Version 1 of the HTTP tracker protocol.
pub mod percent_encoding;
pub mod query;
pub mod requests;
pub mod responses;
pub mod services;
