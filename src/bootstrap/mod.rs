//! Process setup: logging, configuration and the background jobs.
pub mod app;
pub mod jobs;
