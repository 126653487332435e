//! Typed announce and scrape requests parsed from the query string.
pub mod announce;
pub mod scrape;
