//! Version 1 of the HTTP tracker API.
pub mod extractors;
pub mod handlers;
