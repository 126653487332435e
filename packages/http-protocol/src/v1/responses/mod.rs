//! Bencoded response bodies for the HTTP tracker.
//!
//! Dictionary keys are emitted in lexicographic order. The protocol does not
//! strictly require it, but many clients expect it.
pub mod announce;
pub mod error;
pub mod scrape;
